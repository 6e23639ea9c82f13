use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Split};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

use log::{debug, warn};

use super::{decode_line, DumpKind, DumpSource, LineStream, ToolError, Toolchain};

/// Runs binutils (`objdump`, `size`) and streams their stdout line by line.
#[derive(Debug, Clone, Default)]
pub struct ObjdumpBackend {
    pub toolchain: Toolchain,
}

impl ObjdumpBackend {
    pub fn new(toolchain: Toolchain) -> Self {
        Self { toolchain }
    }
}

impl DumpSource for ObjdumpBackend {
    fn lines(&self, kind: DumpKind, binary: &Path) -> Result<LineStream<'_>, ToolError> {
        if !binary.is_file() {
            return Err(ToolError::MissingBinary(binary.to_path_buf()));
        }

        let program = self.toolchain.program(kind.tool());
        debug!("running {} {} {}", program, kind.args().join(" "), binary.display());

        // Spooled, not piped: stderr is only read once stdout is drained.
        let stderr = tempfile::tempfile()?;
        let mut child = Command::new(&program)
            .args(kind.args())
            .arg(binary)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::from(stderr.try_clone()?))
            .spawn()
            .map_err(|source| ToolError::Spawn { tool: program.clone(), source })?;

        let stdout = child.stdout.take().ok_or_else(|| ToolError::Spawn {
            tool: program.clone(),
            source: std::io::Error::other("stdout was not captured"),
        })?;

        Ok(Box::new(ProcessLines {
            program,
            child: Some(child),
            stderr,
            lines: BufReader::new(stdout).split(b'\n'),
        }))
    }

    fn describe(&self, kind: DumpKind) -> String {
        self.toolchain.program(kind.tool())
    }
}

/// Stdout of a running tool. Once stdout is exhausted the child is reaped;
/// its stderr is logged and a non-zero exit is yielded as the final item.
struct ProcessLines {
    program: String,
    child: Option<Child>,
    stderr: File,
    lines: Split<BufReader<ChildStdout>>,
}

impl ProcessLines {
    fn reap(&mut self, mut child: Child) -> Result<(), ToolError> {
        let status = child.wait()?;

        let mut buf = Vec::new();
        self.stderr.seek(SeekFrom::Start(0))?;
        self.stderr.read_to_end(&mut buf)?;
        for line in String::from_utf8_lossy(&buf).lines().filter(|l| !l.trim().is_empty()) {
            warn!("{}: {}", self.program, line.trim());
        }

        if status.success() {
            Ok(())
        } else {
            Err(ToolError::Exit { tool: self.program.clone(), status: status.to_string() })
        }
    }
}

impl Iterator for ProcessLines {
    type Item = Result<String, ToolError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.child.as_ref()?;
        match self.lines.next() {
            Some(Ok(bytes)) => Some(Ok(decode_line(&bytes))),
            Some(Err(e)) => Some(Err(ToolError::Io(e))),
            None => {
                let child = self.child.take()?;
                self.reap(child).err().map(Err)
            }
        }
    }
}

impl Drop for ProcessLines {
    fn drop(&mut self) {
        // Abandoned mid-stream: do not leave the tool running or unreaped.
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_is_reported_before_spawning() {
        let backend = ObjdumpBackend::default();
        let err = backend
            .lines(DumpKind::Disassembly, Path::new("does_not_exist.elf"))
            .err()
            .expect("missing binary");
        assert!(matches!(err, ToolError::MissingBinary(_)));
    }

    #[test]
    fn unknown_tool_fails_to_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("a.out");
        std::fs::write(&bin, b"\x7fELF").unwrap();

        let backend = ObjdumpBackend::new(Toolchain::new("no-such-toolchain-prefix-"));
        let err = backend.lines(DumpKind::SymbolTable, &bin).err().expect("spawn failure");
        assert!(matches!(
            err,
            ToolError::Spawn { ref tool, .. } if tool == "no-such-toolchain-prefix-objdump"
        ));
    }

    #[test]
    fn describe_uses_toolchain_prefix() {
        let backend = ObjdumpBackend::new(Toolchain::new("arm-none-eabi-"));
        assert_eq!(backend.describe(DumpKind::SectionSizes), "arm-none-eabi-size");
    }
}
