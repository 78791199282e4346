//! Terminal detection utilities

use is_terminal::IsTerminal;
use std::env;
use std::io::{stdin, stdout};

/// Check if the operator can answer prompts
///
/// Both stdin and stdout must be terminals, and CI or explicitly
/// non-interactive environments never count as interactive.
pub fn is_interactive() -> bool {
    if !stdout().is_terminal() || !stdin().is_terminal() {
        return false;
    }

    // CI runners sometimes allocate a TTY nobody is watching
    if is_ci_environment() {
        return false;
    }

    if env::var("DEBIAN_FRONTEND").unwrap_or_default() == "noninteractive" {
        return false;
    }

    true
}

/// Detect if running in a CI environment
fn is_ci_environment() -> bool {
    let ci_vars = [
        "CI",
        "CONTINUOUS_INTEGRATION",
        "JENKINS_URL",
        "GITHUB_ACTIONS",
        "GITLAB_CI",
        "TRAVIS",
        "CIRCLECI",
        "BUILDKITE",
        "DRONE",
        "TEAMCITY_VERSION",
        "TF_BUILD", // Azure DevOps
    ];

    ci_vars.iter().any(|var| env::var(var).is_ok())
}
