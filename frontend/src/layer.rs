use common::req::Device;

use crate::{
    batch::MarkerSink,
    cluster::{Cluster, ClusterOptions, Clusterer},
    leaflet::{LayerGroup, Map, Marker},
    marker::MarkerSpec,
};

const MARKER_SIZE: u32 = 24;
const CLUSTER_SIZE: u32 = 40;

/// Map layer drawing devices as clusters for the zoom its current pass
/// started at. Each flush only rebuilds the markers of clusters that changed.
pub struct ClusterLayer {
    map: Map,
    group: LayerGroup,
    devices: Vec<Device>,
    options: ClusterOptions,
    clusterer: Clusterer,
    // one per cluster, same index
    markers: Vec<Marker>,
}

impl ClusterLayer {
    pub fn new(map: Map) -> Self {
        let group = LayerGroup::create(&map);
        let options = ClusterOptions::default();
        let clusterer = Clusterer::new(map.get_zoom(), &options);
        Self {
            map,
            group,
            devices: Vec::new(),
            options,
            clusterer,
            markers: Vec::new(),
        }
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    fn cluster_marker(&self, cluster: &Cluster) -> Marker {
        if cluster.is_single() {
            let spec = MarkerSpec::for_device(&self.devices[cluster.members[0]]);
            let marker = Marker::with_html(spec.lat, spec.lng, &spec.icon_html(), MARKER_SIZE);
            marker.bind_popup(&spec.popup);
            marker
        } else {
            let marker =
                Marker::with_html(cluster.lat, cluster.lng, &cluster.icon_html(), CLUSTER_SIZE);
            marker.bind_popup(&format!(
                "<b>{} devices</b><div>Mean signal: {:.1}/10</div>",
                cluster.len(),
                cluster.mean_signal
            ));
            marker
        }
    }
}

impl MarkerSink for ClusterLayer {
    /// Drops everything drawn and re-clusters at the map's current zoom.
    fn clear(&mut self) {
        self.group.clear_layers();
        self.devices.clear();
        self.markers.clear();
        self.clusterer = Clusterer::new(self.map.get_zoom(), &self.options);
    }

    fn add(&mut self, dev: &Device) {
        self.clusterer.insert(self.devices.len(), dev);
        self.devices.push(dev.clone());
    }

    fn flush(&mut self) {
        for index in self.clusterer.take_changed() {
            let marker = self.cluster_marker(&self.clusterer.cluster(index));
            self.group.add_layer(&marker);
            if index < self.markers.len() {
                let old = std::mem::replace(&mut self.markers[index], marker);
                self.group.remove_layer(&old);
            } else {
                self.markers.push(marker);
            }
        }
    }
}
