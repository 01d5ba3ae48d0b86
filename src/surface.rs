// Canvas surface bookkeeping shared by the DOM host. Pure data, no web-sys.

use std::collections::HashSet;

/// Backing-store size in device pixels for a `css_w` x `css_h` canvas.
#[inline]
pub fn backing_size(css_w: u32, css_h: u32, device_pixel_ratio: f64) -> (u32, u32) {
    let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };
    let w = (css_w as f64 * dpr) as u32;
    let h = (css_h as f64 * dpr) as u32;
    (w.max(1), h.max(1))
}

#[derive(Debug, PartialEq, Eq)]
pub enum Claim {
    /// The container is free; tag the new surface with `marker`.
    Granted { marker: String },
    /// A surface tagged `marker` is still mounted in the container.
    Occupied { marker: String },
}

/// Tracks which marked surfaces belong to a live mount.
///
/// Markers carry a session token, so canvases left behind by an earlier
/// module instance never count as live.
#[derive(Debug)]
pub struct SurfaceRegistry {
    session: u64,
    next_id: u64,
    live: HashSet<u64>,
}

impl SurfaceRegistry {
    pub fn new(session: u64) -> Self {
        Self {
            session,
            next_id: 0,
            live: HashSet::new(),
        }
    }

    fn live_id(&self, marker: &str) -> Option<u64> {
        let (session, id) = marker.split_once(':')?;
        if session.parse::<u64>().ok()? != self.session {
            return None;
        }
        let id = id.parse::<u64>().ok()?;
        self.live.contains(&id).then_some(id)
    }

    /// Claim a container whose marked surfaces carry `present` markers.
    /// On `Granted`, every present surface is stale and may be removed.
    pub fn claim<'a>(&mut self, present: impl IntoIterator<Item = &'a str>) -> Claim {
        if let Some(marker) = present.into_iter().find(|m| self.live_id(m).is_some()) {
            return Claim::Occupied {
                marker: marker.to_string(),
            };
        }
        self.next_id += 1;
        self.live.insert(self.next_id);
        Claim::Granted {
            marker: format!("{}:{}", self.session, self.next_id),
        }
    }

    /// Returns `false` for unknown or already released markers.
    pub fn release(&mut self, marker: &str) -> bool {
        match self.live_id(marker) {
            Some(id) => self.live.remove(&id),
            None => false,
        }
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}
