//! 运行配置：默认值 + 环境变量覆盖

use std::path::PathBuf;

use crate::model::batcher::DEFAULT_BATCH_SIZE;
use crate::model::reinsert::ApplyOptions;
use crate::model::scanner::DEFAULT_EXTENSION;

pub const ENV_BATCH_SIZE: &str = "FANYI_BATCH_SIZE";
pub const ENV_OUTPUT_DIR: &str = "FANYI_OUTPUT_DIR";
pub const ENV_APPLY_EMPTY: &str = "FANYI_APPLY_EMPTY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanyiConfig {
    pub batch_size: usize,
    pub output_dir: Option<PathBuf>,
    pub skip_untranslated: bool,
    pub extension: String,
}

impl Default for FanyiConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            output_dir: None,
            skip_untranslated: true,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl FanyiConfig {
    /// 从进程环境读取配置
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 按给定的查找函数覆盖默认值；无法解析的批大小保留默认并告警
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_BATCH_SIZE) {
            match raw.trim().parse::<usize>() {
                Ok(size) => config.batch_size = size.max(1),
                Err(e) => tracing::warn!("{}={} 无效，使用默认值 {}: {}", ENV_BATCH_SIZE, raw, DEFAULT_BATCH_SIZE, e),
            }
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR).filter(|d| !d.trim().is_empty()) {
            config.output_dir = Some(PathBuf::from(dir));
        }
        if lookup(ENV_APPLY_EMPTY).is_some() {
            config.skip_untranslated = false;
        }
        config
    }

    pub fn apply_options(&self) -> ApplyOptions {
        ApplyOptions {
            output_dir: self.output_dir.clone(),
            skip_untranslated: self.skip_untranslated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = FanyiConfig::from_lookup(lookup(&[]));
        assert_eq!(config, FanyiConfig::default());
        assert_eq!(config.batch_size, 100);
        assert!(config.skip_untranslated);
        assert_eq!(config.extension, "json");
    }

    #[test]
    fn test_overrides() {
        let config = FanyiConfig::from_lookup(lookup(&[
            (ENV_BATCH_SIZE, "25"),
            (ENV_OUTPUT_DIR, "/tmp/out"),
            (ENV_APPLY_EMPTY, "1"),
        ]));
        assert_eq!(config.batch_size, 25);
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/out")));
        assert!(!config.skip_untranslated);

        let options = config.apply_options();
        assert_eq!(options.output_dir, config.output_dir);
        assert!(!options.skip_untranslated);
    }

    #[test]
    fn test_bad_batch_size_keeps_default() {
        assert_eq!(FanyiConfig::from_lookup(lookup(&[(ENV_BATCH_SIZE, "many")])).batch_size, 100);
        assert_eq!(FanyiConfig::from_lookup(lookup(&[(ENV_BATCH_SIZE, "0")])).batch_size, 1);
    }
}
