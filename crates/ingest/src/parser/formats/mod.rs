/// Individual header layouts

pub mod ispn;
pub mod torquebox;

pub use ispn::IspnParser;
pub use torquebox::TorqueBoxParser;
