use std::path::PathBuf;

use clap::Parser;

use grindvakt_config::GrindvaktConfig;

/// Host-resident interactive application firewall daemon.
#[derive(Parser, Debug)]
#[command(name = "grindvakt", version, about)]
pub struct Args {
    /// Socket the decision front-end listens on
    /// (unix:///path or tcp://host:port).
    #[arg(long)]
    pub ui_socket: Option<String>,

    /// Directory to load rules from.
    #[arg(long)]
    pub rules_path: Option<PathBuf>,

    /// Netfilter queue number.
    #[arg(long)]
    pub queue_num: Option<u16>,

    /// Number of concurrent packet workers.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Write logs to this file instead of the standard output.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logs.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Lay the flags over the file/environment configuration; flags win.
    pub fn apply(self, config: &mut GrindvaktConfig) {
        if let Some(socket) = self.ui_socket {
            config.ui.socket = socket;
        }
        if let Some(path) = self.rules_path {
            config.rules.path = path;
        }
        if let Some(num) = self.queue_num {
            config.queue.num = num;
        }
        if let Some(workers) = self.workers {
            config.daemon.workers = workers;
        }
        if let Some(log_file) = self.log_file {
            config.daemon.log_file = Some(log_file);
        }
        if self.debug {
            config.daemon.debug = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_the_layered_config() {
        let args = Args::parse_from([
            "grindvakt",
            "--ui-socket",
            "tcp://127.0.0.1:50051",
            "--queue-num",
            "3",
            "--workers",
            "4",
            "--debug",
        ]);

        let mut config = GrindvaktConfig::default();
        args.apply(&mut config);

        assert_eq!(config.ui.socket, "tcp://127.0.0.1:50051");
        assert_eq!(config.queue.num, 3);
        assert_eq!(config.daemon.workers, 4);
        assert!(config.daemon.debug);
    }

    #[test]
    fn absent_flags_leave_the_config_alone() {
        let args = Args::parse_from(["grindvakt"]);
        let mut config = GrindvaktConfig::default();
        args.apply(&mut config);

        assert_eq!(config.daemon.workers, 16);
        assert_eq!(config.ui.socket, "unix:///tmp/grindvakt.sock");
        assert!(!config.daemon.debug);
    }
}
