//! Screen-space marker clustering.
//!
//! Devices are projected to Web Mercator pixels at the current zoom and
//! grouped greedily: a device joins the nearest cluster whose anchor lies
//! within `max_radius_px`, otherwise it starts a new one. A grid with cells of
//! the radius size keeps the neighbour search to nine cells.

use std::collections::HashMap;
use std::f64::consts::PI;

use common::req::Device;

use crate::signal::{color_for_signal, Rgb};

const TILE_SIZE: f64 = 256.0;
const MAX_LATITUDE: f64 = 85.051_128_78;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterOptions {
    pub max_radius_px: f64,
    /// At this zoom and above every device is shown on its own.
    pub disable_at_zoom: f64,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            max_radius_px: 100.0,
            disable_at_zoom: 18.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Indices into the clustered device slice, in input order.
    pub members: Vec<usize>,
    pub lat: f64,
    pub lng: f64,
    pub mean_signal: f64,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_single(&self) -> bool {
        self.members.len() == 1
    }

    pub fn color(&self) -> Rgb {
        color_for_signal(self.mean_signal)
    }

    /// Count bubble tinted with the mean signal color.
    pub fn icon_html(&self) -> String {
        format!(
            "<div class=\"marker-cluster\" style=\"background: {};\"><span>{}</span></div>",
            self.color(),
            self.len()
        )
    }
}

/// Web Mercator pixel coordinates of a point at `zoom`.
pub fn project(lat: f64, lng: f64, zoom: f64) -> (f64, f64) {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (lng + 180.0) / 360.0 * scale;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * scale;
    (x, y)
}

struct Acc {
    anchor: (f64, f64),
    members: Vec<usize>,
    lat: f64,
    lng: f64,
    signal: f64,
}

impl Acc {
    fn push(&mut self, index: usize, dev: &Device) {
        self.members.push(index);
        self.lat += dev.coordinate_y;
        self.lng += dev.coordinate_x;
        self.signal += dev.signal_quality as f64;
    }

    fn to_cluster(&self) -> Cluster {
        let n = self.members.len() as f64;
        Cluster {
            members: self.members.clone(),
            lat: self.lat / n,
            lng: self.lng / n,
            mean_signal: self.signal / n,
        }
    }
}

/// Greedy clusters for one zoom level, built one device at a time. The
/// clusters touched since the last [`Clusterer::take_changed`] are tracked, so
/// a caller only redraws what changed.
pub struct Clusterer {
    zoom: f64,
    radius: f64,
    enabled: bool,
    accs: Vec<Acc>,
    grid: HashMap<(i64, i64), Vec<usize>>,
    changed: Vec<usize>,
}

impl Clusterer {
    pub fn new(zoom: f64, opts: &ClusterOptions) -> Self {
        Self {
            zoom,
            radius: opts.max_radius_px,
            enabled: zoom < opts.disable_at_zoom && opts.max_radius_px > 0.0,
            accs: Vec::new(),
            grid: HashMap::new(),
            changed: Vec::new(),
        }
    }

    /// Adds device `index` and returns the index of the cluster it joined.
    pub fn insert(&mut self, index: usize, dev: &Device) -> usize {
        let point = project(dev.coordinate_y, dev.coordinate_x, self.zoom);

        let target = if self.enabled {
            let cell = (
                (point.0 / self.radius).floor() as i64,
                (point.1 / self.radius).floor() as i64,
            );
            match nearest_within(&self.grid, &self.accs, cell, point, self.radius) {
                Some(nearest) => nearest,
                None => {
                    self.grid.entry(cell).or_default().push(self.accs.len());
                    self.new_acc(point)
                }
            }
        } else {
            self.new_acc(point)
        };

        self.accs[target].push(index, dev);
        self.changed.push(target);
        target
    }

    fn new_acc(&mut self, anchor: (f64, f64)) -> usize {
        self.accs.push(Acc {
            anchor,
            members: Vec::new(),
            lat: 0.0,
            lng: 0.0,
            signal: 0.0,
        });
        self.accs.len() - 1
    }

    pub fn len(&self) -> usize {
        self.accs.len()
    }

    pub fn cluster(&self, index: usize) -> Cluster {
        self.accs[index].to_cluster()
    }

    /// Clusters created or grown since the previous call, ascending.
    pub fn take_changed(&mut self) -> Vec<usize> {
        let mut changed = std::mem::take(&mut self.changed);
        changed.sort_unstable();
        changed.dedup();
        changed
    }
}

fn nearest_within(
    grid: &HashMap<(i64, i64), Vec<usize>>,
    accs: &[Acc],
    cell: (i64, i64),
    point: (f64, f64),
    radius: f64,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for dx in -1..=1 {
        for dy in -1..=1 {
            let Some(candidates) = grid.get(&(cell.0 + dx, cell.1 + dy)) else {
                continue;
            };
            for &i in candidates {
                let (ax, ay) = accs[i].anchor;
                let dist = ((ax - point.0).powi(2) + (ay - point.1).powi(2)).sqrt();
                if dist <= radius && best.map_or(true, |(_, d)| dist < d) {
                    best = Some((i, dist));
                }
            }
        }
    }
    best.map(|(i, _)| i)
}
