use crate::config::AppConfig;
use crate::processing::{Partition, Threshold};
use crate::types::ObservationRecord;
use serde::Serialize;

pub const HEADER: &str = "John Snow's 1854 Cholera Deaths Map in London";
pub const SUBHEADER: &str = "This is a recreation of Snow's famous map that helped identifying \
     the source of cholera oubreak in London";
pub const SLIDER_LABEL: &str = "Number of Deaths";
pub const CHECKBOX_LABEL: &str = "Show pumps";
pub const MAP_CAPTION: &str = "The red dots show the locations of deaths with a size reflecting \
     the numbers of deaths, and the blue dots show the locations of water pumps.";
pub const IMAGE_HEADER: &str = "Original map of John Snow";
pub const IMAGE_CAPTION: &str = "Original map by John Snow showing the clusters of cholera cases \
     in the London epidemic of 1854, drawn and lithographed by Charles Cheffins";
pub const REFERENCE_IMAGE_URL: &str = "/static/reference.jpg";
pub const ATTRIBUTION_HTML: &[&str] = &[
    "The source of the above map and more details on John Snow's work can be found here: \
     <a href=\"https://en.wikipedia.org/wiki/John_Snow\">https://en.wikipedia.org/wiki/John_Snow</a>",
    "Developed by <a href=\"http://fouad.zablith.org\">Fouad Zablith</a>. If you have any question \
     about this simple app, you can reach me through: \
     <a href=\"https://twitter.com/fzablith\">@fzablith</a>",
];

#[derive(Debug, Clone, Serialize)]
pub struct MapSpec {
    pub header: &'static str,
    pub subheader: &'static str,
    pub slider: SliderSpec,
    pub map_title: String,
    pub checkbox: CheckboxSpec,
    pub view: ViewState,
    pub layers: Vec<LayerSpec>,
    pub caption: &'static str,
    pub image: ImageSpec,
    pub attribution: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct SliderSpec {
    pub label: &'static str,
    pub min: i64,
    pub max: i64,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckboxSpec {
    pub label: &'static str,
    pub checked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewState {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub pitch: f64,
    pub map_style: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayerSpec {
    pub id: &'static str,
    #[serde(rename = "type")]
    pub layer_type: &'static str,
    pub data: Vec<ObservationRecord>,
    pub color: [u8; 4],
    pub radius: Radius,
}

// Radius in meters, per record or fixed for the layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Radius {
    Count,
    Fixed { value: u32 },
}

impl Radius {
    pub fn meters_for(self, record: &ObservationRecord) -> f64 {
        match self {
            Radius::Count => record.count.max(0) as f64,
            Radius::Fixed { value } => value as f64,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageSpec {
    pub header: &'static str,
    pub url: &'static str,
    pub caption: &'static str,
    pub use_column_width: bool,
}

impl MapSpec {
    pub fn build(config: &AppConfig, partition: &Partition<'_>, threshold: Threshold) -> Self {
        let show_pumps = partition.pump_radius > 0;
        Self {
            header: HEADER,
            subheader: SUBHEADER,
            slider: SliderSpec {
                label: SLIDER_LABEL,
                min: config.controls.min_threshold,
                max: config.controls.max_threshold,
                value: threshold.value(),
            },
            map_title: format!("Map of more than {} deaths", threshold.value()),
            checkbox: CheckboxSpec {
                label: CHECKBOX_LABEL,
                checked: show_pumps,
            },
            view: ViewState {
                latitude: config.map.latitude,
                longitude: config.map.longitude,
                zoom: config.map.zoom,
                pitch: config.map.pitch,
                map_style: config.map.style.clone(),
            },
            layers: layers(config, partition),
            caption: MAP_CAPTION,
            image: ImageSpec {
                header: IMAGE_HEADER,
                url: REFERENCE_IMAGE_URL,
                caption: IMAGE_CAPTION,
                use_column_width: true,
            },
            attribution: ATTRIBUTION_HTML,
        }
    }
}

// Deaths first, pumps on top.
pub fn layers(config: &AppConfig, partition: &Partition<'_>) -> Vec<LayerSpec> {
    vec![
        LayerSpec {
            id: "deaths",
            layer_type: "ScatterplotLayer",
            data: partition.deaths.iter().map(|o| ObservationRecord::from(*o)).collect(),
            color: config.layers.death_color,
            radius: Radius::Count,
        },
        LayerSpec {
            id: "pumps",
            layer_type: "ScatterplotLayer",
            data: partition.pumps.iter().map(|o| ObservationRecord::from(*o)).collect(),
            color: config.layers.pump_color,
            radius: Radius::Fixed {
                value: partition.pump_radius,
            },
        },
    ]
}
