//! Jump-host settings: the single bastion configuration scans hop through.

use super::types::JumpServerConfig;

#[derive(Debug, Default, Clone)]
pub struct JumpHostSettings {
    current: Option<JumpServerConfig>,
}

impl JumpHostSettings {
    pub fn new(initial: Option<JumpServerConfig>) -> Self {
        Self { current: initial }
    }

    /// Replace the whole configuration. No field validation: the values are
    /// only ever rendered into banners.
    pub fn save(&mut self, config: JumpServerConfig) {
        self.current = Some(config);
    }

    /// Effective configuration: the saved one, or the defaults.
    pub fn get(&self) -> JumpServerConfig {
        self.current.clone().unwrap_or_default()
    }

    /// The saved configuration, `None` while the defaults apply.
    pub fn configured(&self) -> Option<&JumpServerConfig> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::AuthMethod;

    #[test]
    fn test_unset_returns_defaults() {
        let settings = JumpHostSettings::default();
        let cfg = settings.get();
        assert!(settings.configured().is_none());
        assert_eq!(cfg.hostname, "jump.infra.local");
        assert_eq!(cfg.username, "admin");
        assert_eq!(cfg.port, 22);
        assert_eq!(cfg.auth_method, AuthMethod::Password);
    }

    #[test]
    fn test_save_replaces_wholesale() {
        let mut settings = JumpHostSettings::default();
        settings.save(JumpServerConfig {
            hostname: "bastion-1".to_string(),
            username: "ops".to_string(),
            password: Some("pw".to_string()),
            port: 2222,
            auth_method: AuthMethod::Password,
            key_name: None,
            key_content: None,
        });
        settings.save(JumpServerConfig {
            hostname: "not a hostname!".to_string(),
            port: 0,
            ..Default::default()
        });

        let cfg = settings.get();
        assert_eq!(settings.configured().map(|c| c.port), Some(0));
        assert_eq!(cfg.hostname, "not a hostname!");
        assert_eq!(cfg.port, 0);
        assert_eq!(cfg.username, "admin");
        assert!(cfg.password.is_none());
    }
}
