//! JSON loading for index animation configs.

use crate::config::IndexAnimationCfg;
use crate::error::AnimationError;

/// Parse and validate a config from JSON.
///
/// Missing fields take their defaults; `play_mode` is `"linear"` or `"yoyo"`.
pub fn parse_index_animation_json(json: &str) -> Result<IndexAnimationCfg, AnimationError> {
    let cfg: IndexAnimationCfg = serde_json::from_str(json)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Same as [`parse_index_animation_json`] for an already-decoded value.
pub fn index_animation_from_value(
    value: serde_json::Value,
) -> Result<IndexAnimationCfg, AnimationError> {
    let cfg: IndexAnimationCfg = serde_json::from_value(value)?;
    cfg.validate()?;
    Ok(cfg)
}
