//! Client application state: device cache, add-device flow, form and toasts.
//!
//! Owned by the map component; nothing here touches the DOM, so the whole
//! interaction flow can be driven from tests.

use std::{rc::Rc, time::Duration};

use common::{
    req::{Device, NewDevice, RawDevice},
    validate,
};

pub const PICK_HINT: &str = "Click on the map to choose the device location";
pub const LOAD_FAILED: &str = "Failed to load devices";
pub const SAVED: &str = "Device added";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    DeviceId,
    CoordinateX,
    CoordinateY,
    SignalQuality,
}

impl FormField {
    pub fn name(self) -> &'static str {
        match self {
            FormField::DeviceId => "device_id",
            FormField::CoordinateX => "coordinate_x",
            FormField::CoordinateY => "coordinate_y",
            FormField::SignalQuality => "signal_quality",
        }
    }
}

/// Raw text of the creation form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceForm {
    pub device_id: String,
    pub coordinate_x: String,
    pub coordinate_y: String,
    pub signal_quality: String,
}

impl DeviceForm {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::DeviceId => &self.device_id,
            FormField::CoordinateX => &self.coordinate_x,
            FormField::CoordinateY => &self.coordinate_y,
            FormField::SignalQuality => &self.signal_quality,
        }
    }

    pub fn set(&mut self, field: FormField, value: String) {
        match field {
            FormField::DeviceId => self.device_id = value,
            FormField::CoordinateX => self.coordinate_x = value,
            FormField::CoordinateY => self.coordinate_y = value,
            FormField::SignalQuality => self.signal_quality = value,
        }
    }

    pub fn to_raw(&self) -> RawDevice {
        RawDevice::from_text(
            &self.device_id,
            &self.coordinate_x,
            &self.coordinate_y,
            &self.signal_quality,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Hint,
}

impl ToastKind {
    /// How long the toast stays up.
    pub fn delay(self) -> Duration {
        match self {
            ToastKind::Success => Duration::from_secs(3),
            ToastKind::Error | ToastKind::Hint => Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u32,
    pub kind: ToastKind,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct AppState {
    devices: Vec<Device>,
    form: DeviceForm,
    pick_armed: bool,
    dialog_open: bool,
    saving: bool,
    toasts: Vec<Toast>,
    hint: Option<u32>,
    next_toast: u32,
}

impl AppState {
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn form(&self) -> &DeviceForm {
        &self.form
    }

    pub fn is_pick_armed(&self) -> bool {
        self.pick_armed
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog_open
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    /// Replaces the cache with a freshly loaded list and returns the snapshot
    /// to render.
    pub fn replace_devices(&mut self, devices: Vec<Device>) -> Rc<[Device]> {
        self.devices = devices;
        self.snapshot()
    }

    /// The cached devices, e.g. to draw them again after a zoom.
    pub fn snapshot(&self) -> Rc<[Device]> {
        Rc::from(self.devices.as_slice())
    }

    /// A failed load keeps the cache (and what is drawn) as it was.
    pub fn load_failed(&mut self) -> u32 {
        self.push_toast(ToastKind::Error, LOAD_FAILED)
    }

    /// Arms the one-shot map pick and shows the hint. The pick stays armed
    /// until the map is clicked.
    pub fn begin_add_flow(&mut self) -> u32 {
        self.pick_armed = true;
        self.form.coordinate_x.clear();
        self.form.coordinate_y.clear();
        if let Some(id) = self.hint.take() {
            self.dismiss_toast(id);
        }
        let id = self.push_toast(ToastKind::Hint, PICK_HINT);
        self.hint = Some(id);
        id
    }

    /// Handles a map click. Only the first click after
    /// [`AppState::begin_add_flow`] fills the form and opens the dialog.
    pub fn map_clicked(&mut self, lng: f64, lat: f64) -> bool {
        if !self.pick_armed {
            return false;
        }
        self.pick_armed = false;
        self.form.coordinate_x = format!("{lng:.6}");
        self.form.coordinate_y = format!("{lat:.6}");
        if let Some(id) = self.hint.take() {
            self.dismiss_toast(id);
        }
        self.dialog_open = true;
        true
    }

    pub fn set_field(&mut self, field: FormField, value: String) {
        self.form.set(field, value);
    }

    pub fn close_dialog(&mut self) {
        self.dialog_open = false;
    }

    /// Validates the form with the same rules as the backend. On success the
    /// state is marked as saving and the payload to send is returned; on
    /// failure the messages are shown and nothing is sent.
    pub fn begin_save(&mut self) -> Option<NewDevice> {
        if self.saving {
            return None;
        }
        match validate::validate(&self.form.to_raw()) {
            Ok(dev) => {
                self.saving = true;
                Some(dev)
            }
            Err(errors) => {
                self.push_toast(ToastKind::Error, &errors.join("; "));
                None
            }
        }
    }

    /// Adds the created device to the cache. The caller draws its marker.
    pub fn save_succeeded(&mut self, dev: Device) {
        self.saving = false;
        self.devices.push(dev);
        self.dialog_open = false;
        self.form = DeviceForm::default();
        self.push_toast(ToastKind::Success, SAVED);
    }

    pub fn save_failed(&mut self, message: &str) -> u32 {
        self.saving = false;
        self.push_toast(ToastKind::Error, message)
    }

    pub fn push_toast(&mut self, kind: ToastKind, message: &str) -> u32 {
        self.next_toast += 1;
        self.toasts.push(Toast {
            id: self.next_toast,
            kind,
            message: message.to_owned(),
        });
        self.next_toast
    }

    pub fn dismiss_toast(&mut self, id: u32) -> bool {
        if self.hint == Some(id) {
            self.hint = None;
        }
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }
}
