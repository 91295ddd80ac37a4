use crate::report::font::DEFAULT_FONT_PATH;
use std::path::PathBuf;

pub const DEFAULT_CATALOG_PATH: &str = "data/chapter.json";
pub const DEFAULT_RESULTS_DIR: &str = "data";
pub const DEFAULT_SESSION_TTL_HOURS: u32 = 12;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub catalog_path: PathBuf,
    pub results_dir: PathBuf,
    pub font_path: PathBuf,
    pub session_ttl_hours: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| {
            let port = lookup("PORT").unwrap_or_else(|| "3000".to_string());
            format!("0.0.0.0:{}", port)
        });
        Self {
            bind_addr,
            catalog_path: lookup("CATALOG_PATH")
                .unwrap_or_else(|| DEFAULT_CATALOG_PATH.to_string())
                .into(),
            results_dir: lookup("RESULTS_DIR")
                .unwrap_or_else(|| DEFAULT_RESULTS_DIR.to_string())
                .into(),
            font_path: lookup("REPORT_FONT_PATH")
                .unwrap_or_else(|| DEFAULT_FONT_PATH.to_string())
                .into(),
            session_ttl_hours: lookup("SESSION_TTL_HOURS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_SESSION_TTL_HOURS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::from_lookup(|_| None);
        assert_eq!(cfg.bind_addr, "0.0.0.0:3000");
        assert_eq!(cfg.catalog_path, PathBuf::from("data/chapter.json"));
        assert_eq!(cfg.results_dir, PathBuf::from("data"));
        assert_eq!(
            cfg.font_path,
            PathBuf::from("fonts/SourceHanSansTC-Normal.otf")
        );
        assert_eq!(cfg.session_ttl_hours, 12);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [("PORT", "8080"), ("REPORT_FONT_PATH", "/srv/font.otf")]
            .into_iter()
            .collect();
        let cfg = AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080");
        assert_eq!(cfg.font_path, PathBuf::from("/srv/font.otf"));

        let cfg = AppConfig::from_lookup(|k| (k == "SESSION_TTL_HOURS").then(|| "2".to_string()));
        assert_eq!(cfg.session_ttl_hours, 2);
        let cfg = AppConfig::from_lookup(|k| (k == "SESSION_TTL_HOURS").then(|| "soon".to_string()));
        assert_eq!(cfg.session_ttl_hours, DEFAULT_SESSION_TTL_HOURS);

        let cfg = AppConfig::from_lookup(|k| (k == "BIND_ADDR").then(|| "127.0.0.1:9".to_string()));
        assert_eq!(cfg.bind_addr, "127.0.0.1:9");
    }
}
