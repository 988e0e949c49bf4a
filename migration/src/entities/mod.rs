pub mod click_event;
pub mod visitor;

pub use click_event::Entity as ClickEventEntity;
pub use visitor::Entity as VisitorEntity;
