use std::{collections::HashMap, path::PathBuf, time::Duration};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use derive_builder::Builder;
use derive_deref::{Deref, DerefMut};
use ratatui::style::{Color, Modifier, Style};
use serde::{de, Deserialize, Deserializer};

use crate::{action::Action, constants::game, render::ScreenRect};

const CONFIG: &str = include_str!("../.config/config.yaml");

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub _data_dir: PathBuf,
    #[serde(default)]
    pub _config_dir: PathBuf,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub assets: AssetConfig,
    #[serde(default)]
    pub keybindings: KeyBindings,
    #[serde(default)]
    pub styles: Styles,
}

impl Config {
    /// Embedded defaults, overridden by `config.yaml` in the config directory when present.
    pub fn new() -> Result<Self, config::ConfigError> {
        let data_dir = crate::utils::get_data_dir();
        let config_dir = crate::utils::get_config_dir();
        let config_file = config_dir.join("config.yaml");

        if !config_file.exists() {
            log::info!("No user configuration at {}, using defaults", config_file.display());
        }

        let cfg = config::Config::builder()
            .add_source(config::File::from_str(CONFIG, config::FileFormat::Yaml))
            .set_default("_data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("_config_dir", config_dir.to_string_lossy().to_string())?
            .add_source(config::File::from(config_file).format(config::FileFormat::Yaml).required(false))
            .build()?
            .try_deserialize::<Self>()?;
        cfg.game.validate()?;

        Ok(cfg)
    }
}

/// Every constant of the simulation. Built once at startup and handed to the
/// entities by reference.
#[derive(Clone, Debug, PartialEq, Deserialize, Builder)]
#[builder(default)]
#[serde(default)]
pub struct GameConfig {
    pub viewport_width: i32,
    pub viewport_height: i32,
    pub gravity: f64,
    pub jump_speed: f64,
    pub bird_x: i32,
    pub bird_spawn_height: f64,
    pub bird_width: i32,
    pub bird_height: i32,
    pub bird_frame_ticks: u32,
    pub pipe_width: i32,
    pub pipe_speed: i32,
    pub pipe_gap_min: i32,
    pub pipe_gap_max: i32,
    pub tick_rate: f64,
    pub spawn_interval_ms: u64,
    pub game_over_delay_ms: u64,
    pub title_delay_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            viewport_width: game::VIEWPORT_WIDTH,
            viewport_height: game::VIEWPORT_HEIGHT,
            gravity: game::GRAVITY,
            jump_speed: game::JUMP_SPEED,
            bird_x: game::BIRD_X,
            bird_spawn_height: game::BIRD_SPAWN_HEIGHT,
            bird_width: game::BIRD_WIDTH,
            bird_height: game::BIRD_HEIGHT,
            bird_frame_ticks: game::BIRD_FRAME_TICKS,
            pipe_width: game::PIPE_WIDTH,
            pipe_speed: game::PIPE_SPEED,
            pipe_gap_min: game::PIPE_GAP_MIN,
            pipe_gap_max: game::PIPE_GAP_MAX,
            tick_rate: game::TICK_RATE,
            spawn_interval_ms: game::SPAWN_INTERVAL_MS,
            game_over_delay_ms: game::GAME_OVER_DELAY_MS,
            title_delay_ms: game::TITLE_DELAY_MS,
        }
    }
}

impl GameConfig {
    pub fn viewport(&self) -> ScreenRect {
        ScreenRect::new(0, 0, self.viewport_width, self.viewport_height)
    }

    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    pub fn game_over_delay(&self) -> Duration {
        Duration::from_millis(self.game_over_delay_ms)
    }

    pub fn title_delay(&self) -> Duration {
        Duration::from_millis(self.title_delay_ms)
    }

    /// Reject values the simulation cannot run with: pipes must scroll left
    /// and have width, the spawn cadence and pauses must be non-zero.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let invalid = |field: &str, value: String| {
            Err(config::ConfigError::Message(format!("game.{field} must be positive, got {value}")))
        };

        if self.viewport_width <= 0 {
            return invalid("viewport_width", self.viewport_width.to_string());
        }
        if self.viewport_height <= 0 {
            return invalid("viewport_height", self.viewport_height.to_string());
        }
        if self.pipe_speed <= 0 {
            return invalid("pipe_speed", self.pipe_speed.to_string());
        }
        if self.pipe_width <= 0 {
            return invalid("pipe_width", self.pipe_width.to_string());
        }
        if self.tick_rate.is_nan() || self.tick_rate <= 0.0 {
            return invalid("tick_rate", self.tick_rate.to_string());
        }
        if self.spawn_interval_ms == 0 {
            return invalid("spawn_interval_ms", "0".to_string());
        }
        if self.game_over_delay_ms == 0 {
            return invalid("game_over_delay_ms", "0".to_string());
        }
        if self.title_delay_ms == 0 {
            return invalid("title_delay_ms", "0".to_string());
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub bird_frames: Vec<PathBuf>,
    pub pipe: PathBuf,
    pub background: PathBuf,
    pub font: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            bird_frames: (1..=4).map(|n| PathBuf::from(format!("assets/img/bird_frame_{n}.txt"))).collect(),
            pipe: PathBuf::from("assets/img/pipe.txt"),
            background: PathBuf::from("assets/img/background.txt"),
            font: PathBuf::from("assets/fonts/flappy.font"),
        }
    }
}

#[derive(Clone, Debug, Default, Deref, DerefMut)]
pub struct KeyBindings(pub HashMap<KeyEvent, Action>);

impl<'de> Deserialize<'de> for KeyBindings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = HashMap::<String, String>::deserialize(deserializer)?;

        let bindings = raw
            .into_iter()
            .map(|(key, action)| {
                let event = parse_key_event(&key).map_err(de::Error::custom)?;
                let action: Action = serde_yaml::from_str(&action)
                    .map_err(|e| de::Error::custom(format!("unknown action `{action}` for `{key}`: {e}")))?;
                Ok((event, action))
            })
            .collect::<Result<_, D::Error>>()?;

        Ok(KeyBindings(bindings))
    }
}

fn parse_key_event(raw: &str) -> Result<KeyEvent, String> {
    let raw = raw.trim();
    let inner = raw.strip_prefix('<').and_then(|r| r.strip_suffix('>')).unwrap_or(raw);
    if inner.contains(['<', '>']) {
        return Err(format!("Unable to parse `{raw}`"));
    }

    let lower = inner.to_ascii_lowercase();
    let (remaining, modifiers) = extract_modifiers(&lower);
    parse_key_code_with_modifiers(remaining, modifiers)
}

fn extract_modifiers(raw: &str) -> (&str, KeyModifiers) {
    let mut modifiers = KeyModifiers::empty();
    let mut current = raw;

    loop {
        if let Some(rest) = current.strip_prefix("ctrl-") {
            modifiers.insert(KeyModifiers::CONTROL);
            current = rest;
        } else if let Some(rest) = current.strip_prefix("alt-") {
            modifiers.insert(KeyModifiers::ALT);
            current = rest;
        } else if let Some(rest) = current.strip_prefix("shift-") {
            modifiers.insert(KeyModifiers::SHIFT);
            current = rest;
        } else {
            break;
        }
    }

    (current, modifiers)
}

fn parse_key_code_with_modifiers(raw: &str, modifiers: KeyModifiers) -> Result<KeyEvent, String> {
    let code = match raw {
        "esc" => KeyCode::Esc,
        "enter" => KeyCode::Enter,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "space" => KeyCode::Char(' '),
        "minus" | "hyphen" => KeyCode::Char('-'),
        f if f.len() > 1 && f.starts_with('f') => match f[1..].parse::<u8>() {
            Ok(n @ 1..=12) => KeyCode::F(n),
            _ => return Err(format!("Unable to parse {raw}")),
        },
        c if c.chars().count() == 1 => {
            let c = c.chars().next().unwrap_or_default();
            KeyCode::Char(if modifiers.contains(KeyModifiers::SHIFT) { c.to_ascii_uppercase() } else { c })
        },
        _ => return Err(format!("Unable to parse {raw}")),
    };
    Ok(KeyEvent::new(code, modifiers))
}

/// Named styles, e.g. `bird: bold yellow` or `background: dim white on black`.
#[derive(Clone, Debug, Default, Deref, DerefMut)]
pub struct Styles(pub HashMap<String, Style>);

impl Styles {
    pub fn style(&self, name: &str) -> Style {
        self.0.get(name).copied().unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for Styles {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = HashMap::<String, String>::deserialize(deserializer)?;
        Ok(Styles(raw.into_iter().map(|(name, style)| (name, parse_style(&style))).collect()))
    }
}

pub fn parse_style(line: &str) -> Style {
    let padded = format!(" {} ", line.to_lowercase());
    let (foreground, background) = padded.split_once(" on ").unwrap_or((padded.as_str(), ""));
    let (fg, fg_modifiers) = process_color_string(foreground);
    let (bg, bg_modifiers) = process_color_string(background);

    let mut style = Style::default();
    if let Some(fg) = fg {
        style = style.fg(fg);
    }
    if let Some(bg) = bg {
        style = style.bg(bg);
    }
    style.add_modifier(fg_modifiers | bg_modifiers)
}

fn process_color_string(color_str: &str) -> (Option<Color>, Modifier) {
    let mut modifiers = Modifier::empty();
    let mut words = Vec::new();
    for word in color_str.split_whitespace() {
        match word {
            "bold" => modifiers |= Modifier::BOLD,
            "dim" => modifiers |= Modifier::DIM,
            "italic" => modifiers |= Modifier::ITALIC,
            "underline" => modifiers |= Modifier::UNDERLINED,
            "inverse" => modifiers |= Modifier::REVERSED,
            word => words.push(word),
        }
    }

    (parse_color(&words.join(" ")), modifiers)
}

fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim().replace("grey", "gray");
    if s.is_empty() {
        None
    } else if let Some(index) = s.strip_prefix("color") {
        index.parse::<u8>().ok().map(Color::Indexed)
    } else if let Some(rgb) = s.strip_prefix("rgb") {
        let digits: Vec<u8> = rgb.chars().filter_map(|c| c.to_digit(6)).map(|d| d as u8).collect();
        match digits[..] {
            [r, g, b] if rgb.len() == 3 => Some(Color::Indexed(16 + r * 36 + g * 6 + b)),
            _ => None,
        }
    } else {
        s.parse::<Color>().ok()
    }
}
