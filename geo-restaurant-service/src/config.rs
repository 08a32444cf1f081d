use std::net::SocketAddr;

use clap::Args;

#[derive(Debug, Clone, Args)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string; the database needs the PostGIS extension
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    #[arg(long, env = "DATABASE_POOL_SIZE", default_value_t = 10)]
    pub pool_size: u32,
}

#[derive(Debug, Clone, Args)]
pub struct ServeConfig {
    #[command(flatten)]
    pub database: DatabaseConfig,

    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8000")]
    pub listen_addr: SocketAddr,

    /// Username required by the admin screens (HTTP Basic)
    #[arg(long, env = "ADMIN_USERNAME", requires = "admin_password")]
    pub admin_username: Option<String>,

    #[arg(long, env = "ADMIN_PASSWORD", requires = "admin_username", hide_env_values = true)]
    pub admin_password: Option<String>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl ServeConfig {
    pub fn admin_credentials(&self) -> Option<AdminCredentials> {
        match (&self.admin_username, &self.admin_password) {
            (Some(username), Some(password)) => Some(AdminCredentials {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        serve: ServeConfig,
    }

    #[test]
    fn test_defaults() {
        let cli = TestCli::try_parse_from(["test", "--database-url", "postgres://localhost/geo"])
            .unwrap();

        assert_eq!(cli.serve.database.pool_size, 10);
        assert_eq!(cli.serve.listen_addr, "0.0.0.0:8000".parse().unwrap());
    }

    #[test]
    fn test_admin_credentials_come_in_pairs() {
        let result = TestCli::try_parse_from([
            "test",
            "--database-url",
            "postgres://localhost/geo",
            "--admin-username",
            "admin",
        ]);
        assert!(result.is_err());

        let cli = TestCli::try_parse_from([
            "test",
            "--database-url",
            "postgres://localhost/geo",
            "--admin-username",
            "admin",
            "--admin-password",
            "secret",
        ])
        .unwrap();
        assert_eq!(
            cli.serve.admin_credentials(),
            Some(AdminCredentials {
                username: "admin".to_string(),
                password: "secret".to_string(),
            })
        );
    }
}
