pub mod catalog;
pub mod document;
pub mod layout;
pub mod photo;
pub mod storybook;
