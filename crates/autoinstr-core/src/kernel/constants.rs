/// Application name
pub const APP_NAME: &str = "autoinstr";

/// Version handed to configurators as the auto-instrumentation version
pub const AUTO_INSTRUMENTATION_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the disabled instrumentations
pub const ENV_DISABLED_INSTRUMENTATIONS: &str = "AUTOINSTR_DISABLED_INSTRUMENTATIONS";

/// Environment variable naming the distro to select
pub const ENV_DISTRO: &str = "AUTOINSTR_DISTRO";

/// Environment variable naming the configurator to run
pub const ENV_CONFIGURATOR: &str = "AUTOINSTR_CONFIGURATOR";

/// Placeholder replaced by the package identifier in the install command
pub const PACKAGE_PLACEHOLDER: &str = "{package}";

/// Default command listing installed packages as JSON
pub const DEFAULT_LIST_COMMAND: &[&str] = &["python3", "-m", "pip", "list", "--format=json"];

/// Default command installing one package
pub const DEFAULT_INSTALL_COMMAND: &[&str] = &[
    "python3",
    "-m",
    "pip",
    "install",
    "-U",
    "--upgrade-strategy",
    "only-if-needed",
    PACKAGE_PLACEHOLDER,
];

/// Default environment-wide consistency check
pub const DEFAULT_CHECK_COMMAND: &[&str] = &["python3", "-m", "pip", "check"];
