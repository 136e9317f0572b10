//! Banner script for the simulated jump-host session.
//!
//! Pure builders: given the jump host, the target and a timestamp they return
//! the exact ordered lines and pauses the workflow plays back.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::types::{AuthMethod, JumpServerConfig};

pub const PARSING_BANNER: &str = "[InfraScan] Parsing hardware telemetry...";
pub const ERROR_BANNER: &str = "[Error] Connection lost or parsing failed.";

/// Source address shown in the fake "Last login" line.
const LAST_LOGIN_FROM: &str = "192.168.0.45";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    Line(String),
    Pause(Duration),
}

fn line(s: impl Into<String>) -> ScriptStep {
    ScriptStep::Line(s.into())
}

fn pause(ms: u64) -> ScriptStep {
    ScriptStep::Pause(Duration::from_millis(ms))
}

/// Local shell → jump host → target, up to the data-gathering prompt.
pub fn connect_steps(
    jump: &JumpServerConfig,
    target: &str,
    now: DateTime<Utc>,
) -> Vec<ScriptStep> {
    let host = &jump.hostname;
    let user = &jump.username;
    let port = jump.port;

    let mut steps = vec![
        line(format!("[local]$ initiating on-demand session to {}...", host)),
        pause(400),
    ];

    match jump.auth_method {
        AuthMethod::Key => steps.extend([
            line(format!(
                "[local]$ ssh -i ~/.ssh/{} -p {} {}@{}",
                jump.key_name_or_default(),
                port,
                user,
                host
            )),
            pause(600),
            line("Authenticated with partial public key \"SHA256:...\""),
        ]),
        AuthMethod::Password => steps.extend([
            line(format!("[local]$ ssh -p {} {}@{}", port, user, host)),
            pause(600),
            line(format!("{}@{}'s password: **********", user, host)),
        ]),
    }

    steps.extend([
        line(""),
        line(format!("[{}@{} ~]$ Connection established.", user, host)),
        line(format!(
            "Last login: {} from {}",
            now.format("%a, %d %b %Y %H:%M:%S GMT"),
            LAST_LOGIN_FROM
        )),
        pause(500),
        line(format!("[{}@{} ~]$ ssh root@{}", user, host, target)),
        pause(800),
        line(format!(
            "Warning: Permanently added '{}' (ECDSA) to the list of known hosts.",
            target
        )),
        line(format!("root@{}'s password: ", target)),
        pause(600),
        line(""),
        line(format!("[root@{} ~]$ gathering system info...", target)),
    ]);

    steps
}

/// Log out of the target, then out of the jump host.
pub fn disconnect_steps(jump: &JumpServerConfig, target: &str) -> Vec<ScriptStep> {
    let host = &jump.hostname;
    let user = &jump.username;

    vec![
        pause(400),
        line(""),
        line(format!("[root@{} ~]$ exit", target)),
        line("logout"),
        line(format!("Connection to {} closed.", target)),
        pause(300),
        line(format!("[{}@{} ~]$ exit", user, host)),
        line("logout"),
        line(format!("Connection to {} closed.", host)),
        line("[local]$ Session terminated."),
    ]
}

pub fn parsing_steps() -> Vec<ScriptStep> {
    vec![line(""), line(PARSING_BANNER)]
}

pub fn error_steps() -> Vec<ScriptStep> {
    vec![line(""), line(ERROR_BANNER)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn lines(steps: &[ScriptStep]) -> Vec<&str> {
        steps
            .iter()
            .filter_map(|s| match s {
                ScriptStep::Line(l) => Some(l.as_str()),
                ScriptStep::Pause(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_default_jump_host_password_banners() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 18, 5, 9).unwrap();
        let steps = connect_steps(&JumpServerConfig::default(), "10.0.0.7", now);

        assert_eq!(
            lines(&steps),
            vec![
                "[local]$ initiating on-demand session to jump.infra.local...",
                "[local]$ ssh -p 22 admin@jump.infra.local",
                "admin@jump.infra.local's password: **********",
                "",
                "[admin@jump.infra.local ~]$ Connection established.",
                "Last login: Mon, 19 Oct 2026 18:05:09 GMT from 192.168.0.45",
                "[admin@jump.infra.local ~]$ ssh root@10.0.0.7",
                "Warning: Permanently added '10.0.0.7' (ECDSA) to the list of known hosts.",
                "root@10.0.0.7's password: ",
                "",
                "[root@10.0.0.7 ~]$ gathering system info...",
            ]
        );
    }

    #[test]
    fn test_key_auth_references_key_file() {
        let jump = JumpServerConfig {
            hostname: "bastion".to_string(),
            username: "ops".to_string(),
            port: 2202,
            auth_method: AuthMethod::Key,
            key_name: Some("fleet_ed25519".to_string()),
            ..Default::default()
        };
        let steps = connect_steps(&jump, "10.0.0.7", Utc::now());
        let l = lines(&steps);

        assert_eq!(l[1], "[local]$ ssh -i ~/.ssh/fleet_ed25519 -p 2202 ops@bastion");
        assert_eq!(l[2], "Authenticated with partial public key \"SHA256:...\"");
        assert!(!l.iter().any(|s| s.contains("password: **")));
    }

    #[test]
    fn test_pacing_schedule() {
        let jump = JumpServerConfig::default();
        let pauses: Vec<u128> = connect_steps(&jump, "t", Utc::now())
            .into_iter()
            .chain(disconnect_steps(&jump, "t"))
            .filter_map(|s| match s {
                ScriptStep::Pause(d) => Some(d.as_millis()),
                ScriptStep::Line(_) => None,
            })
            .collect();
        assert_eq!(pauses, vec![400, 600, 500, 800, 600, 400, 300]);
    }

    #[test]
    fn test_disconnect_closes_target_before_jump() {
        let steps = disconnect_steps(&JumpServerConfig::default(), "10.0.0.7");
        let l = lines(&steps);
        let target = l.iter().position(|s| *s == "Connection to 10.0.0.7 closed.").unwrap();
        let jump = l
            .iter()
            .position(|s| *s == "Connection to jump.infra.local closed.")
            .unwrap();
        assert!(target < jump);
        assert_eq!(*l.last().unwrap(), "[local]$ Session terminated.");
    }
}
