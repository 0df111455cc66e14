use figment::Jail;
use mil_config::MilConfig;
use mil_core::authority::AuthorityPolicy;

#[test]
fn env_vars_override_defaults() {
    Jail::expect_with(|jail| {
        jail.set_env("MILSTONE_SERVER__HOST", "0.0.0.0");
        jail.set_env("MILSTONE_SERVER__PORT", "9001");

        let config = MilConfig::load(None).expect("config loads");
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9001);
        Ok(())
    });
}

#[test]
fn env_authority_level_resolves_through_policy() {
    Jail::expect_with(|jail| {
        jail.set_env("MILSTONE_AUTHORITY__LEVELS__dana", "3");

        let config = MilConfig::load(None).expect("config loads");
        assert_eq!(config.authority.level_of("dana").unwrap().get(), 3);
        Ok(())
    });
}
