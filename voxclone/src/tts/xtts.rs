//! Coqui XTTS backend using PyO3 to embed Python.
//!
//! Voice cloning from a short reference recording in any of the XTTS
//! languages. The model is loaded on first use and kept for the lifetime
//! of the backend handle.

use super::{TtsBackend, TtsOptions};
use crate::config::TtsConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use once_cell::sync::OnceCell;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

/// Initialize the Python runtime once per process.
static PYTHON_INIT: Once = Once::new();

struct XttsModel {
    model_name: String,
    gpu: bool,
    model: OnceCell<Py<PyAny>>,
}

/// XTTS backend. Cloning the handle shares the loaded model.
#[derive(Clone)]
pub struct XttsBackend {
    inner: Arc<XttsModel>,
}

impl XttsBackend {
    pub fn new(config: &TtsConfig) -> Result<Self> {
        let site_packages = config.python_site_packages.clone();

        PYTHON_INIT.call_once(|| {
            pyo3::prepare_freethreaded_python();

            if let Some(site_packages) = site_packages {
                let _ = Python::with_gil(|py| -> PyResult<()> {
                    let sys = py.import("sys")?;
                    let path = sys.getattr("path")?;
                    path.call_method1("insert", (0, site_packages.to_string_lossy().as_ref()))?;
                    Ok(())
                });
            }
        });

        Python::with_gil(|py| py.import("TTS.api").map(|_| ())).context(
            "Python package `TTS` not importable. Install it with `pip install TTS` \
             or point tts.python_site_packages at its site-packages directory.",
        )?;

        Ok(Self {
            inner: Arc::new(XttsModel {
                model_name: config.model_name.clone(),
                gpu: config.gpu,
                model: OnceCell::new(),
            }),
        })
    }
}

impl XttsModel {
    /// Load the model on first call.
    ///
    /// The GIL is only taken inside the initializer, so threads waiting on
    /// the cell never hold it.
    fn model(&self) -> Result<&Py<PyAny>> {
        self.model.get_or_try_init(|| {
            info!("Loading TTS model {}", self.model_name);
            Python::with_gil(|py| -> Result<Py<PyAny>> {
                let use_gpu = self.gpu && cuda_available(py)?;
                debug!("XTTS gpu={}", use_gpu);

                let api = py.import("TTS.api")?;
                let kwargs = PyDict::new(py);
                kwargs.set_item("progress_bar", false)?;
                kwargs.set_item("gpu", use_gpu)?;
                let model = api
                    .getattr("TTS")?
                    .call((self.model_name.as_str(),), Some(&kwargs))
                    .with_context(|| format!("Failed to load {}", self.model_name))?;
                Ok(model.unbind())
            })
        })
    }

    fn generate_audio_sync(&self, text: &str, output_path: &Path, options: &TtsOptions) -> Result<()> {
        let model = self.model()?;

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Python::with_gil(|py| {
            let kwargs = PyDict::new(py);
            kwargs.set_item("text", text)?;
            kwargs.set_item("speaker_wav", options.speaker_wav.to_string_lossy().as_ref())?;
            kwargs.set_item("language", options.language.as_str())?;
            kwargs.set_item("file_path", output_path.to_string_lossy().as_ref())?;

            model
                .bind(py)
                .call_method("tts_to_file", (), Some(&kwargs))
                .context("tts_to_file failed")?;

            cleanup_memory(py)
        })
    }
}

fn cuda_available(py: Python<'_>) -> Result<bool> {
    let torch = py.import("torch").context("Failed to import torch")?;
    Ok(torch
        .getattr("cuda")?
        .call_method0("is_available")?
        .extract::<bool>()?)
}

/// Cleanup GPU memory to mitigate leaks.
fn cleanup_memory(py: Python<'_>) -> Result<()> {
    py.import("gc")?.call_method0("collect")?;

    if cuda_available(py)? {
        py.import("torch")?
            .getattr("cuda")?
            .call_method0("empty_cache")?;
    }

    Ok(())
}

#[async_trait]
impl TtsBackend for XttsBackend {
    async fn synthesize(
        &self,
        text: &str,
        output_path: &Path,
        options: &TtsOptions,
    ) -> Result<()> {
        let inner = Arc::clone(&self.inner);
        let text = text.to_string();
        let output_path: PathBuf = output_path.to_path_buf();
        let options = options.clone();

        // Python holds the GIL for the whole call; keep it off the async workers
        tokio::task::spawn_blocking(move || inner.generate_audio_sync(&text, &output_path, &options))
            .await
            .context("Task join error")??;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "xtts"
    }

    fn is_loaded(&self) -> bool {
        self.inner.model.get().is_some()
    }
}
