use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};

use crate::storage::{ClickEvent, NewClick, NewVisit, Visit};
use migration::entities::{click_event, visitor};

pub fn model_to_visit(model: visitor::Model) -> Visit {
    Visit {
        id: model.id,
        session_id: model.session_id,
        entry_page: model.entry_page,
        user_agent: model.user_agent,
        referrer: model.referrer,
        country: model.country,
        city: model.city,
        created_at: model.created_at,
    }
}

pub fn model_to_click_event(model: click_event::Model) -> ClickEvent {
    ClickEvent {
        id: model.id,
        visitor_id: model.visitor_id,
        element_id: model.element_id,
        element_class: model.element_class,
        element_text: model.element_text,
        page_url: model.page_url,
        x_position: model.x_position,
        y_position: model.y_position,
        created_at: model.created_at,
    }
}

/// 主键由数据库分配，created_at 由存储端统一赋值
pub fn new_visit_to_active_model(row: NewVisit, created_at: DateTime<Utc>) -> visitor::ActiveModel {
    visitor::ActiveModel {
        id: NotSet,
        session_id: Set(row.session_id),
        entry_page: Set(row.entry_page),
        user_agent: Set(row.user_agent),
        referrer: Set(row.referrer),
        country: Set(row.country),
        city: Set(row.city),
        created_at: Set(created_at),
    }
}

pub fn new_click_to_active_model(
    row: NewClick,
    created_at: DateTime<Utc>,
) -> click_event::ActiveModel {
    click_event::ActiveModel {
        id: NotSet,
        visitor_id: Set(row.visitor_id),
        element_id: Set(row.element_id),
        element_class: Set(row.element_class),
        element_text: Set(row.element_text),
        page_url: Set(row.page_url),
        x_position: Set(row.x_position),
        y_position: Set(row.y_position),
        created_at: Set(created_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    #[test]
    fn test_new_visit_keeps_nullable_geo_fields() {
        let now = Utc::now();
        let am = new_visit_to_active_model(
            NewVisit {
                session_id: "1700000000000-abc123xyz".into(),
                entry_page: "https://example.com/".into(),
                user_agent: "UA".into(),
                referrer: String::new(),
                country: None,
                city: Some("Unknown".into()),
            },
            now,
        );

        assert!(matches!(am.id, ActiveValue::NotSet));
        assert_eq!(am.country, ActiveValue::Set(None));
        assert_eq!(am.city, ActiveValue::Set(Some("Unknown".to_string())));
        assert_eq!(am.created_at, ActiveValue::Set(now));
    }

    #[test]
    fn test_model_to_click_event() {
        let now = Utc::now();
        let event = model_to_click_event(click_event::Model {
            id: 9,
            visitor_id: "sid".into(),
            element_id: "buy".into(),
            element_class: "btn primary".into(),
            element_text: "Buy".into(),
            page_url: "https://example.com/p".into(),
            x_position: 10,
            y_position: 20,
            created_at: now,
        });

        assert_eq!(event.id, 9);
        assert_eq!(event.element_class, "btn primary");
        assert_eq!((event.x_position, event.y_position), (10, 20));
    }
}
