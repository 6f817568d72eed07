//! Socket inode to process identity resolution via `/proc`.

use std::fs;
use std::path::Path;

use grindvakt_core::Process;

/// Walk `/proc/<pid>/fd` looking for the process holding the socket inode.
///
/// Returns `None` when the owner exited between packet and lookup; the
/// caller keeps the connection with an unresolved process.
pub(crate) fn by_inode(inode: u64, uid: u32) -> Option<Process> {
    let target = format!("socket:[{inode}]");
    let entries = fs::read_dir("/proc").ok()?;

    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(pid) = name.to_str().and_then(|s| s.parse::<u32>().ok()) else {
            continue;
        };
        if owns_socket(entry.path().as_path(), &target) {
            return Some(describe(pid, uid));
        }
    }
    None
}

fn owns_socket(proc_dir: &Path, target: &str) -> bool {
    let Ok(fds) = fs::read_dir(proc_dir.join("fd")) else {
        return false;
    };
    fds.flatten().any(|fd| {
        fs::read_link(fd.path())
            .map(|link| link.to_string_lossy() == target)
            .unwrap_or(false)
    })
}

fn describe(pid: u32, uid: u32) -> Process {
    let path = fs::read_link(format!("/proc/{pid}/exe"))
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".into());
    let cmdline = fs::read(format!("/proc/{pid}/cmdline"))
        .map(|raw| {
            raw.split(|b| *b == 0)
                .filter(|part| !part.is_empty())
                .map(|part| String::from_utf8_lossy(part).into_owned())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();

    Process {
        pid,
        uid,
        path,
        cmdline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_our_own_process() {
        // The test binary itself is the one process guaranteed to exist.
        let pid = std::process::id();
        let process = describe(pid, 0);
        assert_eq!(process.pid, pid);
        assert!(!process.path.is_empty());
    }

    #[test]
    fn missing_inode_resolves_to_none() {
        // Inode 1 is never a socket owned by a live process fd table.
        assert!(by_inode(1, 0).is_none());
    }
}
