//! Notifier implementations for the watch loop.
//!
//! Delivery is delegated to an external command so the mail transport stays
//! outside this process; anything from spawn failure to a non-zero exit
//! collapses to `false` and a stderr line, never a panic across the
//! `Notifier` boundary.

use slate_core::Notifier;

/// Runs a configured argv with recipient, subject, and body appended.
pub struct CommandNotifier {
    argv: Vec<String>,
}

impl CommandNotifier {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

impl Notifier for CommandNotifier {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> bool {
        let Some((bin, args)) = self.argv.split_first() else {
            eprintln!("notify: empty delivery command");
            return false;
        };

        let output = std::process::Command::new(bin)
            .args(args)
            .arg(recipient)
            .arg(subject)
            .arg(body)
            .output();

        match output {
            Ok(out) if out.status.success() => true,
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                eprintln!("notify: {bin} exited {}: {}", out.status, stderr.trim());
                false
            }
            Err(e) => {
                eprintln!("notify: failed to run {bin}: {e}");
                false
            }
        }
    }
}

/// Prints the message instead of delivering it. Used by `watch --dry-run`.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> bool {
        println!("[DRY RUN] to {recipient}: {subject}\n          {body}");
        true
    }
}

pub fn is_valid_email(target: &str) -> bool {
    let target = target.trim();
    let Some(at) = target.find('@') else {
        return false;
    };

    let local = &target[..at];
    let domain = &target[at + 1..];
    let local_ok =
        !local.is_empty() && local.chars().all(|c| c.is_alphanumeric() || "._+-".contains(c));
    let domain_ok = !domain.is_empty()
        && domain.contains('.')
        && domain
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '.');
    local_ok && domain_ok
}
