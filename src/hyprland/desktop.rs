//! Desktop backend built on Hyprland IPC.
//!
//! Talks to Hyprland through its command socket at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`.
//! Every request opens a short-lived connection with read and write
//! timeouts, so a stalled compositor cannot hang a session.
//!
//! Targets are the client windows visible on the monitors' active
//! workspaces.  "Clicking" a target focuses it and parks the pointer on
//! its center.

use crate::command::{Rect, Target, TargetHandle, TargetKind};
use crate::config::DetectorConfig;
use crate::traits::{ClickDispatcher, CursorMover, ElementDetector};
use log::{debug, warn};
use serde::Deserialize;
use std::collections::HashSet;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::time::Duration;

/// Hyprland-backed detector, click dispatcher, and cursor mover.
#[derive(Debug, Clone)]
pub struct HyprlandDesktop {
    timeout: Duration,
    include_floating: bool,
}

/// Errors that can occur when talking to Hyprland.
#[derive(Debug, thiserror::Error)]
#[error("hyprland IPC error: {0}")]
pub struct HyprlandError(String);

impl Default for HyprlandDesktop {
    fn default() -> Self {
        Self::new(&DetectorConfig::default())
    }
}

impl HyprlandDesktop {
    /// No connection is opened eagerly.
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            timeout: config.timeout(),
            include_floating: config.include_floating,
        }
    }

    fn request(&self, command: &str) -> Result<String, HyprlandError> {
        let path = socket_path()?;
        let mut stream = UnixStream::connect(&path)
            .map_err(|e| HyprlandError(format!("connect to {}: {}", path.display(), e)))?;
        stream
            .set_read_timeout(Some(self.timeout))
            .and_then(|()| stream.set_write_timeout(Some(self.timeout)))
            .map_err(|e| HyprlandError(format!("timeout: {}", e)))?;

        stream
            .write_all(command.as_bytes())
            .map_err(|e| HyprlandError(format!("write: {}", e)))?;

        let mut response = Vec::new();
        stream
            .read_to_end(&mut response)
            .map_err(|e| HyprlandError(format!("read: {}", e)))?;

        String::from_utf8(response).map_err(|e| HyprlandError(format!("utf-8: {}", e)))
    }

    /// `j/<query>`, parsed.
    fn query<T: for<'de> Deserialize<'de>>(&self, query: &str) -> Result<T, HyprlandError> {
        let json = self.request(&format!("j/{}", query))?;
        serde_json::from_str(&json).map_err(|e| HyprlandError(format!("parse {}: {}", query, e)))
    }

    fn dispatch(&self, args: &str) -> Result<(), HyprlandError> {
        let response = self.request(&format!("/dispatch {}", args))?;
        if response.trim() == "ok" {
            Ok(())
        } else {
            Err(HyprlandError(format!("dispatch {:?}: {}", args, response.trim())))
        }
    }

    fn try_detect(&self) -> Result<Vec<Target>, HyprlandError> {
        let monitors: Vec<MonitorJson> = self.query("monitors")?;
        let clients: Vec<ClientJson> = self.query("clients")?;
        Ok(visible_targets(clients, &monitors, self.include_floating))
    }
}

/// Hyprland ≥ 0.40 keeps its sockets under `$XDG_RUNTIME_DIR/hypr`.
fn socket_path() -> Result<PathBuf, HyprlandError> {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
        .map_err(|_| HyprlandError("XDG_RUNTIME_DIR not set".into()))?;
    let his = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
        .map_err(|_| HyprlandError("HYPRLAND_INSTANCE_SIGNATURE not set".into()))?;
    Ok(PathBuf::from(runtime_dir)
        .join("hypr")
        .join(his)
        .join(".socket.sock"))
}

//  JSON subsets

#[derive(Debug, Deserialize)]
struct WorkspaceRef {
    id: i64,
}

/// Subset of `j/monitors`.
#[derive(Debug, Deserialize)]
struct MonitorJson {
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    #[serde(default = "unit_scale")]
    scale: f64,
    #[serde(rename = "activeWorkspace")]
    active_workspace: WorkspaceRef,
    #[serde(rename = "specialWorkspace")]
    special_workspace: Option<WorkspaceRef>,
}

fn unit_scale() -> f64 {
    1.0
}

impl MonitorJson {
    /// The monitor in layout coordinates (physical size over scale).
    fn rect(&self) -> Rect {
        let scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        Rect::new(
            self.x,
            self.y,
            (self.width as f64 / scale).round() as u32,
            (self.height as f64 / scale).round() as u32,
        )
    }
}

/// Subset of `j/clients`.
#[derive(Debug, Deserialize)]
struct ClientJson {
    address: String,
    #[serde(default = "yes")]
    mapped: bool,
    #[serde(default)]
    hidden: bool,
    at: [i32; 2],
    size: [i32; 2],
    workspace: WorkspaceRef,
    #[serde(default)]
    floating: bool,
    #[serde(default)]
    class: String,
    #[serde(default)]
    title: String,
}

fn yes() -> bool {
    true
}

/// Clients shown on some monitor right now, top-to-bottom then
/// left-to-right.
fn visible_targets(
    clients: Vec<ClientJson>,
    monitors: &[MonitorJson],
    include_floating: bool,
) -> Vec<Target> {
    let shown: HashSet<i64> = monitors
        .iter()
        .flat_map(|m| {
            std::iter::once(m.active_workspace.id)
                .chain(m.special_workspace.as_ref().map(|w| w.id).filter(|&id| id != 0))
        })
        .collect();

    let mut targets: Vec<Target> = clients
        .into_iter()
        .filter(|c| c.mapped && !c.hidden)
        .filter(|c| shown.contains(&c.workspace.id))
        .filter(|c| include_floating || !c.floating)
        .filter(|c| c.size[0] > 0 && c.size[1] > 0)
        .map(|c| Target {
            rect: Rect::new(c.at[0], c.at[1], c.size[0] as u32, c.size[1] as u32),
            kind: TargetKind::Control,
            name: if c.title.is_empty() { c.class } else { c.title },
            handle: TargetHandle(c.address),
        })
        .collect();
    targets.sort_by_key(|t| (t.rect.y, t.rect.x));
    targets
}

/// Bounding box of every monitor.
fn display_bounds(monitors: &[MonitorJson]) -> Option<Rect> {
    monitors
        .iter()
        .map(MonitorJson::rect)
        .reduce(|a, b| a.union(&b))
}

//  Trait implementations

impl ElementDetector for HyprlandDesktop {
    fn detect(&self) -> Vec<Target> {
        match self.try_detect() {
            Ok(targets) => {
                debug!("detected {} window(s)", targets.len());
                targets
            }
            Err(e) => {
                warn!("detection failed: {}", e);
                Vec::new()
            }
        }
    }
}

impl ClickDispatcher for HyprlandDesktop {
    type Error = HyprlandError;

    fn activate(&self, target: &Target) -> Result<(), HyprlandError> {
        self.dispatch(&format!("focuswindow address:{}", target.handle.0))?;
        let (x, y) = target.rect.center();
        self.move_to(x, y)
    }
}

impl CursorMover for HyprlandDesktop {
    type Error = HyprlandError;

    fn move_to(&self, x: i32, y: i32) -> Result<(), HyprlandError> {
        self.dispatch(&format!("movecursor {} {}", x, y))
    }

    fn bounds(&self) -> Result<Rect, HyprlandError> {
        let monitors: Vec<MonitorJson> = self.query("monitors")?;
        display_bounds(&monitors).ok_or_else(|| HyprlandError("no monitors".into()))
    }
}
