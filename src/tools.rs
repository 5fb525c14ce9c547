//! External tool capabilities.
//!
//! Two things are delegated to other programs: decoding JPEG XL (via a
//! converter such as `djxl`) and moving files to the system trash (via a
//! `trash` command). Both sit behind small traits so the rest of the crate can
//! be exercised with fakes that never spawn a process.
//!
//! | Capability | Trait | Process-backed impl | Invocation |
//! |---|---|---|---|
//! | Format conversion | [`Converter`] | [`CommandConverter`] | `<tool> <input> <output>` |
//! | Trash | [`TrashService`] | [`CommandTrash`] | `<tool> <path>` |
//!
//! Tool lookup goes through `which`, so a missing tool is reported as
//! [`ToolError::Unavailable`] before anything is spawned.

use crate::config::AppConfig;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

pub const DEFAULT_CONVERTER: &str = "djxl";
pub const DEFAULT_TRASH: &str = "trash";

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("'{0}' command not found in PATH")]
    Unavailable(String),
    #[error("failed to run '{tool}': {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{tool}' exited with {}: {stderr}", exit_label(.code))]
    Failed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "a signal".to_string(),
    }
}

/// Converts an image the general decoder can't read into a PNG.
pub trait Converter: Send + Sync {
    /// Program name, used in error messages.
    fn name(&self) -> &str;

    /// Whether the tool can be invoked at all.
    fn is_available(&self) -> bool;

    /// Write a PNG rendition of `input` to `output`.
    fn convert(&self, input: &Path, output: &Path) -> Result<(), ToolError>;
}

/// Moves files somewhere recoverable instead of unlinking them.
pub trait TrashService: Send + Sync {
    fn name(&self) -> &str;

    fn is_available(&self) -> bool;

    fn move_to_trash(&self, path: &Path) -> Result<(), ToolError>;
}

/// A program resolved from `PATH` and run to completion.
#[derive(Debug, Clone)]
struct ExternalTool {
    program: String,
}

impl ExternalTool {
    fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn locate(&self) -> Result<PathBuf, ToolError> {
        which::which(&self.program).map_err(|_| ToolError::Unavailable(self.program.clone()))
    }

    fn run(&self, args: &[&Path]) -> Result<(), ToolError> {
        let binary = self.locate()?;
        log::debug!("running {} {:?}", binary.display(), args);

        let output = Command::new(&binary)
            .args(args)
            .output()
            .map_err(|source| ToolError::Spawn {
                tool: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ToolError::Failed {
                tool: self.program.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// [`Converter`] that shells out to a command-line decoder (`djxl` by default).
#[derive(Debug, Clone)]
pub struct CommandConverter {
    tool: ExternalTool,
}

impl CommandConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            tool: ExternalTool::new(program),
        }
    }
}

impl Default for CommandConverter {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERTER)
    }
}

impl Converter for CommandConverter {
    fn name(&self) -> &str {
        &self.tool.program
    }

    fn is_available(&self) -> bool {
        self.tool.locate().is_ok()
    }

    fn convert(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        self.tool.run(&[input, output])
    }
}

/// [`TrashService`] that shells out to a `trash` command.
#[derive(Debug, Clone)]
pub struct CommandTrash {
    tool: ExternalTool,
}

impl CommandTrash {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            tool: ExternalTool::new(program),
        }
    }
}

impl Default for CommandTrash {
    fn default() -> Self {
        Self::new(DEFAULT_TRASH)
    }
}

impl TrashService for CommandTrash {
    fn name(&self) -> &str {
        &self.tool.program
    }

    fn is_available(&self) -> bool {
        self.tool.locate().is_ok()
    }

    fn move_to_trash(&self, path: &Path) -> Result<(), ToolError> {
        self.tool.run(&[path])
    }
}

/// The trash service for `config`, resolved once at startup.
///
/// `None` when `use_trash` is off. With it on, a trash program missing from
/// `PATH` is an error here, before any deletion can be attempted.
pub fn require_trash(config: &AppConfig) -> Result<Option<CommandTrash>, ToolError> {
    if !config.use_trash {
        return Ok(None);
    }
    let trash = CommandTrash::new(config.tools.trash.clone());
    if !trash.is_available() {
        return Err(ToolError::Unavailable(config.tools.trash.clone()));
    }
    log::debug!("using '{}' for deletions", trash.name());
    Ok(Some(trash))
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use image::RgbaImage;
    use std::sync::Mutex;

    /// What a [`MockConverter`] does when invoked.
    #[derive(Debug, Clone)]
    pub enum ConvertBehavior {
        /// Write this image as a PNG to the output path.
        WritePng(RgbaImage),
        /// Write junk to the output path, then report failure.
        PartialWriteThenFail,
        /// Report failure without touching the filesystem.
        Fail,
    }

    /// Mock converter that records invocations.
    /// Uses Mutex (not RefCell) so it is Sync and can be shared with rayon.
    pub struct MockConverter {
        pub available: bool,
        pub behavior: ConvertBehavior,
        pub calls: Mutex<Vec<(PathBuf, PathBuf)>>,
    }

    impl MockConverter {
        pub fn new(behavior: ConvertBehavior) -> Self {
            Self {
                available: true,
                behavior,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn unavailable() -> Self {
            Self {
                available: false,
                ..Self::new(ConvertBehavior::Fail)
            }
        }

        pub fn get_calls(&self) -> Vec<(PathBuf, PathBuf)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Converter for MockConverter {
        fn name(&self) -> &str {
            "mock-djxl"
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn convert(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
            self.calls
                .lock()
                .unwrap()
                .push((input.to_path_buf(), output.to_path_buf()));

            match &self.behavior {
                ConvertBehavior::WritePng(img) => {
                    img.save_with_format(output, image::ImageFormat::Png)
                        .unwrap();
                    Ok(())
                }
                ConvertBehavior::PartialWriteThenFail => {
                    std::fs::write(output, b"\x89PNG truncated").unwrap();
                    Err(ToolError::Failed {
                        tool: self.name().to_string(),
                        code: Some(1),
                        stderr: "decode error".into(),
                    })
                }
                ConvertBehavior::Fail => Err(ToolError::Failed {
                    tool: self.name().to_string(),
                    code: Some(1),
                    stderr: "bad input".into(),
                }),
            }
        }
    }

    /// Mock trash that records paths instead of moving them.
    #[derive(Default)]
    pub struct MockTrash {
        pub fail: bool,
        pub trashed: Mutex<Vec<PathBuf>>,
    }

    impl MockTrash {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn get_trashed(&self) -> Vec<PathBuf> {
            self.trashed.lock().unwrap().clone()
        }
    }

    impl TrashService for MockTrash {
        fn name(&self) -> &str {
            "mock-trash"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn move_to_trash(&self, path: &Path) -> Result<(), ToolError> {
            if self.fail {
                return Err(ToolError::Failed {
                    tool: self.name().to_string(),
                    code: Some(2),
                    stderr: "permission denied".into(),
                });
            }
            self.trashed.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    #[test]
    fn missing_program_is_unavailable() {
        let converter = CommandConverter::new("imgcomp-no-such-tool-7f3a");
        assert!(!converter.is_available());

        let err = converter
            .convert(Path::new("a.jxl"), Path::new("a.png"))
            .unwrap_err();
        assert!(matches!(err, ToolError::Unavailable(ref t) if t == "imgcomp-no-such-tool-7f3a"));
    }

    #[test]
    fn missing_trash_is_unavailable() {
        let trash = CommandTrash::new("imgcomp-no-such-trash-7f3a");
        assert!(!trash.is_available());
        assert!(matches!(
            trash.move_to_trash(Path::new("x.png")),
            Err(ToolError::Unavailable(_))
        ));
    }

    #[test]
    fn defaults_use_standard_tool_names() {
        assert_eq!(CommandConverter::default().name(), "djxl");
        assert_eq!(CommandTrash::default().name(), "trash");
    }

    #[test]
    fn failed_error_message_includes_status_and_stderr() {
        let err = ToolError::Failed {
            tool: "djxl".into(),
            code: Some(3),
            stderr: "not a jxl file".into(),
        };
        assert_eq!(err.to_string(), "'djxl' exited with status 3: not a jxl file");
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_failed() {
        // `false` is on PATH on any unix and always exits 1
        let trash = CommandTrash::new("false");
        let err = trash.move_to_trash(Path::new("whatever")).unwrap_err();
        assert!(matches!(err, ToolError::Failed { code: Some(1), .. }));
    }

    #[test]
    fn trash_not_required_when_disabled() {
        let config = AppConfig {
            use_trash: false,
            ..AppConfig::default()
        };
        assert!(require_trash(&config).unwrap().is_none());
    }

    #[test]
    fn missing_trash_tool_is_caught_before_deleting() {
        let tmp = tempfile::TempDir::new().unwrap();
        let target = tmp.path().join("keep.png");
        std::fs::write(&target, b"png").unwrap();

        let mut config = AppConfig {
            use_trash: true,
            ..AppConfig::default()
        };
        config.tools.trash = "imgcomp-no-such-trash-7f3a".into();

        let err = require_trash(&config).unwrap_err();
        assert!(matches!(err, ToolError::Unavailable(ref t) if t == "imgcomp-no-such-trash-7f3a"));
        assert!(target.exists());
        assert_eq!(std::fs::read(&target).unwrap(), b"png");
    }

    #[cfg(unix)]
    #[test]
    fn available_trash_tool_is_returned() {
        let mut config = AppConfig {
            use_trash: true,
            ..AppConfig::default()
        };
        config.tools.trash = "true".into();
        assert_eq!(require_trash(&config).unwrap().unwrap().name(), "true");
    }

    #[test]
    fn mock_trash_records_paths() {
        let trash = MockTrash::default();
        trash.move_to_trash(Path::new("/tmp/a.png")).unwrap();
        assert_eq!(trash.get_trashed(), vec![PathBuf::from("/tmp/a.png")]);
    }
}
