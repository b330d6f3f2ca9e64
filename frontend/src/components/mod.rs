pub mod device_form;
pub mod devices;
pub mod map;
pub mod toast;
