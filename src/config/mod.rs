use std::{
    collections::HashMap,
    env,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use directories::BaseDirs;

use crate::cli::Cli;

pub const REPORT_FILE: &str = "verify_results.json";
pub const SCRATCH_DIR_NAME: &str = "tmp_verify";

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    /// Defaults, then `.verifyrc`, then `VERIFY_*` environment variables.
    pub fn load() -> Self {
        let config_path = default_config_path();
        let rc = fs::read_to_string(&config_path).ok();
        Self::from_sources(config_path, rc.as_deref(), env::vars())
    }

    pub fn from_sources<I>(config_path: PathBuf, rc: Option<&str>, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut map = default_map();

        if let Some(text) = rc {
            for line in text.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((k, v)) = line.split_once('=') {
                    map.insert(k.trim().to_string(), v.trim().to_string());
                }
            }
        }

        for (k, v) in vars {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self { inner: map, config_path }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).filter(|v| !v.is_empty()).cloned()
    }

    pub fn get_u64(&self, key: &str) -> Result<Option<u64>> {
        self.get(key)
            .map(|v| v.parse::<u64>().with_context(|| format!("{} must be a non-negative integer, got {:?}", key, v)))
            .transpose()
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).map(PathBuf::from)
    }
}

fn is_config_key(k: &str) -> bool {
    const KEYS: &[&str] = &[
        "VERIFY_COMPILER",
        "VERIFY_COMPILER_FLAGS",
        "VERIFY_SCRATCH_DIR",
        "VERIFY_REPORT",
        "VERIFY_TIMEOUT",
        "VERIFY_JOBS",
        "VERIFY_LOG",
    ];
    KEYS.contains(&k)
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("example_verify").join(".verifyrc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();
    m.insert("VERIFY_COMPILER".into(), "gcc".into());
    m.insert("VERIFY_COMPILER_FLAGS".into(), "-lm".into());
    m.insert("VERIFY_TIMEOUT".into(), "10".into());
    m.insert("VERIFY_JOBS".into(), "1".into());
    m
}

/// Everything one run needs, resolved from CLI flags over [`Config`].
#[derive(Debug, Clone)]
pub struct Settings {
    pub bank: PathBuf,
    pub scratch_dir: PathBuf,
    pub report_path: PathBuf,
    pub compiler: String,
    pub compiler_flags: Vec<String>,
    pub timeout: Duration,
    pub jobs: usize,
    pub extra_markers: Vec<String>,
    pub strict: bool,
    pub color: bool,
}

impl Settings {
    pub fn resolve(cli: &Cli, cfg: &Config, stdout_is_tty: bool) -> Result<Self> {
        let bank = cli.bank.clone();
        let scratch_dir = cli
            .scratch_dir
            .clone()
            .or_else(|| cfg.get_path("VERIFY_SCRATCH_DIR"))
            .unwrap_or_else(|| default_scratch_dir(&bank));
        let report_path = cli
            .report
            .clone()
            .or_else(|| cfg.get_path("VERIFY_REPORT"))
            .unwrap_or_else(|| scratch_dir.join(REPORT_FILE));
        let compiler = cli
            .compiler
            .clone()
            .or_else(|| cfg.get("VERIFY_COMPILER"))
            .unwrap_or_else(|| "gcc".to_string());
        // configured flags first, `--flag` values after them
        let mut compiler_flags: Vec<String> = cfg
            .get("VERIFY_COMPILER_FLAGS")
            .map(|v| v.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        compiler_flags.extend(cli.flags.iter().cloned());

        let timeout_secs = match cli.timeout {
            Some(t) => t,
            None => cfg.get_u64("VERIFY_TIMEOUT")?.unwrap_or(10),
        };
        if timeout_secs == 0 {
            bail!("timeout must be at least 1 second");
        }
        let jobs = match cli.jobs {
            Some(j) => j,
            None => cfg.get_u64("VERIFY_JOBS")?.unwrap_or(1) as usize,
        };
        if jobs == 0 {
            bail!("jobs must be at least 1");
        }

        Ok(Self {
            bank,
            scratch_dir,
            report_path,
            compiler,
            compiler_flags,
            timeout: Duration::from_secs(timeout_secs),
            jobs,
            extra_markers: cli.markers.clone(),
            strict: cli.strict,
            color: stdout_is_tty && !cli.no_color,
        })
    }
}

fn default_scratch_dir(bank: &Path) -> PathBuf {
    match bank.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(SCRATCH_DIR_NAME),
        _ => PathBuf::from(SCRATCH_DIR_NAME),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cfg(rc: Option<&str>, vars: &[(&str, &str)]) -> Config {
        Config::from_sources(
            PathBuf::from("/nonexistent/.verifyrc"),
            rc,
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())),
        )
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("example-verify").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn env_overrides_rc_overrides_defaults() {
        let c = cfg(Some("# comment\nVERIFY_COMPILER = clang\nVERIFY_TIMEOUT=3\n"), &[("VERIFY_TIMEOUT", "5"), ("HOME", "/x")]);
        assert_eq!(c.get("VERIFY_COMPILER").as_deref(), Some("clang"));
        assert_eq!(c.get_u64("VERIFY_TIMEOUT").unwrap(), Some(5));
        assert_eq!(c.get("HOME"), None);
        assert_eq!(c.get("VERIFY_JOBS").as_deref(), Some("1"));
    }

    #[test]
    fn defaults_follow_bank_location() {
        let s = Settings::resolve(&cli(&["data/questions.json"]), &cfg(None, &[]), false).unwrap();
        assert_eq!(s.scratch_dir, PathBuf::from("data/tmp_verify"));
        assert_eq!(s.report_path, PathBuf::from("data/tmp_verify/verify_results.json"));
        assert_eq!(s.compiler, "gcc");
        assert_eq!(s.compiler_flags, vec!["-lm".to_string()]);
        assert_eq!(s.timeout, Duration::from_secs(10));
        assert_eq!(s.jobs, 1);
        assert!(!s.color);

        let bare = Settings::resolve(&cli(&["questions.json"]), &cfg(None, &[]), false).unwrap();
        assert_eq!(bare.scratch_dir, PathBuf::from("tmp_verify"));
    }

    #[test]
    fn cli_flags_win() {
        let s = Settings::resolve(
            &cli(&[
                "q.json", "--compiler", "cc", "--flag", "-O2", "--flag", "-Wall", "--timeout", "2", "--jobs", "4",
                "--scratch-dir", "/tmp/s", "--report", "/tmp/r.json", "--marker", "Result", "--strict",
            ]),
            &cfg(None, &[("VERIFY_COMPILER", "clang"), ("VERIFY_JOBS", "8")]),
            true,
        )
        .unwrap();
        assert_eq!(s.compiler, "cc");
        assert_eq!(s.compiler_flags, vec!["-lm".to_string(), "-O2".to_string(), "-Wall".to_string()]);
        assert_eq!(s.timeout, Duration::from_secs(2));
        assert_eq!(s.jobs, 4);
        assert_eq!(s.report_path, PathBuf::from("/tmp/r.json"));
        assert_eq!(s.extra_markers, vec!["Result".to_string()]);
        assert!(s.strict);
        assert!(s.color);
    }

    #[test]
    fn cli_flags_extend_configured_flags() {
        let keeps_libm = Settings::resolve(&cli(&["q.json", "--flag", "-std=c99"]), &cfg(None, &[]), false).unwrap();
        assert_eq!(keeps_libm.compiler_flags, vec!["-lm".to_string(), "-std=c99".to_string()]);

        let cleared = Settings::resolve(
            &cli(&["q.json", "--flag", "-std=c99"]),
            &cfg(None, &[("VERIFY_COMPILER_FLAGS", "")]),
            false,
        )
        .unwrap();
        assert_eq!(cleared.compiler_flags, vec!["-std=c99".to_string()]);
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(Settings::resolve(&cli(&["q.json"]), &cfg(None, &[("VERIFY_TIMEOUT", "soon")]), false).is_err());
        assert!(Settings::resolve(&cli(&["q.json"]), &cfg(None, &[("VERIFY_JOBS", "0")]), false).is_err());
        assert!(Settings::resolve(&cli(&["q.json", "--timeout", "0"]), &cfg(None, &[]), false).is_err());
    }
}
