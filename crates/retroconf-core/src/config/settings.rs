use indexmap::IndexMap;
use serde_json::Number;
use std::fmt;

/// Scalar written on the right-hand side of a `retroarch.cfg` line.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Str(String),
    Int(i64),
    Float(f64),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Str(s) => f.write_str(s),
            SettingValue::Int(i) => write!(f, "{}", i),
            // Integral floats keep their fraction: `1.0`, not `1`.
            SettingValue::Float(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Str(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Str(value)
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Str(if value { "true" } else { "false" }.to_string())
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Int(value)
    }
}

impl From<usize> for SettingValue {
    fn from(value: usize) -> Self {
        SettingValue::Int(value as i64)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        SettingValue::Float(value)
    }
}

impl From<&Number> for SettingValue {
    fn from(value: &Number) -> Self {
        match value.as_i64() {
            Some(i) => SettingValue::Int(i),
            None => SettingValue::Float(value.as_f64().unwrap_or_default()),
        }
    }
}

/// Ordered set of derived settings. A key keeps the position of its first
/// write and the value of its last one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputSettings {
    entries: IndexMap<String, SettingValue>,
}

impl OutputSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<SettingValue>) {
        self.entries.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.entries.get(key)
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.to_string())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins_but_position_is_kept() {
        let mut settings = OutputSettings::new();
        settings.set("aspect_ratio_index", "");
        settings.set("video_smooth", false);
        settings.set("aspect_ratio_index", 22i64);

        let keys: Vec<&str> = settings.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["aspect_ratio_index", "video_smooth"]);
        assert_eq!(settings.get("aspect_ratio_index"), Some(&SettingValue::Int(22)));
    }

    #[test]
    fn values_render_as_cfg_scalars() {
        let mut settings = OutputSettings::new();
        settings.set("video_smooth", true);
        settings.set("aspect_ratio_index", 1usize);
        settings.set("video_message_pos_x", 0.05);
        settings.set("input_overlay_scale", "1.0");

        let lines: Vec<String> = settings.iter().map(|(k, v)| format!("{} = {}", k, v)).collect();
        assert_eq!(
            lines,
            vec![
                "video_smooth = true",
                "aspect_ratio_index = 1",
                "video_message_pos_x = 0.05",
                "input_overlay_scale = 1.0",
            ]
        );
    }

    #[test]
    fn integral_floats_keep_their_fraction() {
        let mut settings = OutputSettings::new();
        settings.set("input_overlay_opacity", 1.0);
        settings.set("custom_viewport_width", 1439.5);
        assert_eq!(settings.get_string("input_overlay_opacity").as_deref(), Some("1.0"));
        assert_eq!(settings.get_string("custom_viewport_width").as_deref(), Some("1439.5"));
    }

    #[test]
    fn json_numbers_keep_their_kind() {
        let int: Number = serde_json::from_str("1440").unwrap();
        let float: Number = serde_json::from_str("1440.0").unwrap();
        assert_eq!(SettingValue::from(&int), SettingValue::Int(1440));
        assert_eq!(SettingValue::from(&float), SettingValue::Float(1440.0));
    }
}
