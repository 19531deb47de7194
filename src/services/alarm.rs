use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Mutex, PoisonError};

use tokio::process::Child;

use crate::config::AlarmConfig;

/// Fire-and-forget local alarm sound.
pub trait Alarm {
    fn play(&self) -> Result<(), AlarmError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AlarmError {
    #[error("alarm sound {path} could not be loaded: {source}")]
    Load {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("alarm sound was never loaded")]
    NotLoaded,
    #[error("failed to start alarm player {player}: {source}")]
    Spawn {
        player: String,
        #[source]
        source: std::io::Error,
    },
}

/// Plays the sound file by spawning an external player (e.g. `aplay alarm.wav`).
///
/// 同一时刻至多一个播放进程：再次触发会先终止仍在播放的上一个。
#[derive(Debug)]
pub struct CommandAlarm {
    player: String,
    sound: Option<PathBuf>,
    current: Mutex<Option<Child>>,
}

impl CommandAlarm {
    /// 启动时加载一次；加载失败只记录日志，之后每次播放返回 `NotLoaded`
    pub fn load(config: &AlarmConfig) -> Self {
        let sound = match Self::verify(Path::new(&config.sound_file)) {
            Ok(path) => {
                tracing::info!(sound = %path.display(), "Alarm sound loaded");
                Some(path)
            }
            Err(e) => {
                tracing::error!(error = %e, "Alarm initialization failed");
                None
            }
        };
        Self {
            player: config.player.clone(),
            sound,
            current: Mutex::new(None),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.sound.is_some()
    }

    /// Process id of the most recently started player, if any.
    pub fn player_id(&self) -> Option<u32> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(Child::id)
    }

    fn verify(path: &Path) -> Result<PathBuf, AlarmError> {
        let load_err = |source| AlarmError::Load {
            path: path.display().to_string(),
            source,
        };
        let metadata = std::fs::metadata(path).map_err(load_err)?;
        if !metadata.is_file() {
            return Err(load_err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }
        Ok(path.to_path_buf())
    }
}

impl Alarm for CommandAlarm {
    fn play(&self) -> Result<(), AlarmError> {
        let sound = self.sound.as_ref().ok_or(AlarmError::NotLoaded)?;
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);

        // 重新开始播放：先停掉上一次仍未结束的播放
        if let Some(mut previous) = current.take() {
            if matches!(previous.try_wait(), Ok(None)) {
                if let Err(e) = previous.start_kill() {
                    tracing::warn!(error = %e, "Failed to stop previous alarm player");
                }
            }
        }

        // 不等待播放结束；退出后由 tokio 在后台回收
        let child = tokio::process::Command::new(&self.player)
            .arg(sound)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AlarmError::Spawn {
                player: self.player.clone(),
                source,
            })?;
        *current = Some(child);
        tracing::info!("Alarm playing");
        Ok(())
    }
}
