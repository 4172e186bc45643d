use loadkit_common::{LoadKitError, Result, RewriteMode};
use std::fs::{self, File, Permissions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Closed interval `[start, end]` of 1-indexed line numbers.
///
/// `start > end` selects no lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// `true` if `line` falls inside the range and should be removed.
    pub fn contains(&self, line: usize) -> bool {
        !(line < self.start || line > self.end)
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// Remove lines `start..=end` (1-indexed) from the file at `path`.
///
/// The file is read fully into memory and rewritten through a sibling temp
/// file, so a failure at any step leaves the original content in place.
/// Every retained line is written back with a `\n` terminator.
pub fn remove_line_range(path: impl AsRef<Path>, start: usize, end: usize) -> Result<()> {
    remove_line_range_with(path, LineRange::new(start, end), RewriteMode::Atomic)
}

/// Like [`remove_line_range`], with an explicit [`RewriteMode`].
///
/// With [`RewriteMode::InPlace`] the file is truncated before the retained
/// lines are written. If a write fails after that point the file is left
/// partially written; callers that cannot tolerate this should use
/// [`RewriteMode::Atomic`]. Read failures never touch the file in either mode.
///
/// When no line falls inside `range` the file is left as it is.
pub fn remove_line_range_with(
    path: impl AsRef<Path>,
    range: LineRange,
    mode: RewriteMode,
) -> Result<()> {
    let path = path.as_ref();
    let Scan { retained, removed, permissions } = read_retained(path, range)?;
    if removed == 0 {
        debug!(
            path = %path.display(),
            start = range.start,
            end = range.end,
            "no lines in range"
        );
        return Ok(());
    }
    debug!(
        path = %path.display(),
        start = range.start,
        end = range.end,
        retained = retained.len(),
        ?mode,
        "rewriting file"
    );
    match mode {
        RewriteMode::Atomic => rewrite_atomic(path, &retained, permissions),
        RewriteMode::InPlace => rewrite_in_place(path, &retained),
    }
}

struct Scan {
    retained: Vec<String>,
    removed: usize,
    permissions: Permissions,
}

/// Read `path` line by line, keeping the lines outside `range`.
/// The read handle is closed before this returns.
fn read_retained(path: &Path, range: LineRange) -> Result<Scan> {
    let file = File::open(path).map_err(|e| LoadKitError::io(path, e))?;
    let permissions = file
        .metadata()
        .map_err(|e| LoadKitError::io(path, e))?
        .permissions();

    let mut retained = Vec::new();
    let mut removed = 0;
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| LoadKitError::io(path, e))?;
        if range.contains(idx + 1) {
            removed += 1;
        } else {
            retained.push(line);
        }
    }
    Ok(Scan { retained, removed, permissions })
}

fn rewrite_in_place(path: &Path, lines: &[String]) -> Result<()> {
    let file = File::create(path).map_err(|e| LoadKitError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    write_lines(&mut writer, lines).map_err(|e| LoadKitError::io(path, e))
}

fn rewrite_atomic(path: &Path, lines: &[String], permissions: Permissions) -> Result<()> {
    // Rename onto the link target, not the link.
    let target = fs::canonicalize(path).map_err(|e| LoadKitError::io(path, e))?;
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| LoadKitError::io(dir, e))?;
    let tmp_path = tmp.path().to_path_buf();
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write_lines(&mut writer, lines).map_err(|e| LoadKitError::io(&tmp_path, e))?;
    }
    tmp.as_file()
        .set_permissions(permissions)
        .map_err(|e| LoadKitError::io(&tmp_path, e))?;
    // On failure the temp file is removed when `PersistError` drops.
    tmp.persist(&target).map_err(|e| LoadKitError::io(&target, e.error))?;
    Ok(())
}

fn write_lines<W: Write>(writer: &mut W, lines: &[String]) -> std::io::Result<()> {
    for line in lines {
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}
