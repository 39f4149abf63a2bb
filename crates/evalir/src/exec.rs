use anyhow::{Context, Result};
use evalir_core::{codegen::ObjectEmitter, ir_persist, Module};
use evalir_emit::{Emitter, EmitterConfig, TextEmitter};
use evalir_transform::{transform_eval_to_ir_with_config, CompilerConfig};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecConfig {
    pub compiler: CompilerConfig,
    /// Used for stdout only. The saved text file is always uncolored.
    pub emitter: EmitterConfig,
    pub output_path: Option<PathBuf>,
    pub object_path: Option<PathBuf>,
    pub json_path: Option<PathBuf>,
    /// Recorded in the module metadata.
    pub source_file: Option<String>,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            compiler: CompilerConfig::default(),
            emitter: EmitterConfig::default(),
            output_path: Some(PathBuf::from("./out.ll")),
            object_path: None,
            json_path: None,
            source_file: None,
        }
    }
}

/// Compile `program`, print the IR to stdout and write the configured artifacts.
pub fn exec(program: &str, config: &ExecConfig) -> Result<Module> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    exec_to(program, config, &mut out)
}

pub fn exec_to<W: Write>(program: &str, config: &ExecConfig, out: &mut W) -> Result<Module> {
    let module =
        transform_eval_to_ir_with_config(program, config.source_file.as_deref(), &config.compiler)?;

    let text = TextEmitter::new(config.emitter.clone()).emit_to_string(&module)?;
    writeln!(out, "{}", text)?;

    if let Some(path) = &config.output_path {
        let plain = EmitterConfig {
            use_colors: false,
            ..config.emitter.clone()
        };
        let text = TextEmitter::new(plain).emit_to_string(&module)?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write IR to {}", path.display()))?;
        debug!(path = %path.display(), "saved IR text");
    }

    if let Some(path) = &config.json_path {
        ir_persist::save_module(&module, path)
            .with_context(|| format!("Failed to write JSON to {}", path.display()))?;
        debug!(path = %path.display(), "saved IR JSON");
    }

    if let Some(path) = &config.object_path {
        let bytes = ObjectEmitter::new(&module.name)?.emit(&module)?;
        std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write object file to {}", path.display()))?;
        debug!(path = %path.display(), "saved object file");
    }

    info!(module = %module.name, "exec finished");
    Ok(module)
}
