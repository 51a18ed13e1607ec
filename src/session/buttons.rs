use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    recorder::entities::{Category, Event},
};

#[derive(Debug, Clone)]
struct Button {
    category: Category,
    active: bool,
}

/// The set of toggle buttons an observer presses during a lesson. Each button represents one
/// category; pressing it alternates between START and END.
///
/// When `multiple` is false at most one button can be active: pressing a button first ends every
/// other active one.
#[derive(Debug, Clone)]
pub struct ButtonPanel {
    buttons: Vec<Button>,
    multiple: bool,
}

impl ButtonPanel {
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>, multiple: bool) -> Result<Self> {
        let mut buttons: Vec<Button> = vec![];
        for name in names {
            let category = Category::new(name)?;
            if buttons.iter().any(|v| v.category == category) {
                info!("Button {category} is already registered");
                continue;
            }
            buttons.push(Button {
                category,
                active: false,
            });
        }
        Ok(Self { buttons, multiple })
    }

    /// Toggles the button called `name` and returns the events that the press produced, in the
    /// order they have to be recorded.
    pub fn click(&mut self, name: &str, time: DateTime<Utc>) -> Result<Vec<Event>> {
        let Some(position) = self.position(name) else {
            return Err(Error::InvalidArgument(format!("unknown button {name:?}")));
        };

        let mut events = vec![];
        if !self.multiple {
            for (i, button) in self.buttons.iter_mut().enumerate() {
                if i != position && button.active {
                    debug!("Ending {} in favour of {name}", button.category);
                    button.active = false;
                    events.push(Event::end(button.category.clone(), time));
                }
            }
        }

        let button = &mut self.buttons[position];
        button.active = !button.active;
        events.push(if button.active {
            Event::start(button.category.clone(), time)
        } else {
            Event::end(button.category.clone(), time)
        });
        Ok(events)
    }

    /// Switches off every active button.
    pub fn deactivate_all(&mut self, time: DateTime<Utc>) -> Vec<Event> {
        self.buttons
            .iter_mut()
            .filter(|v| v.active)
            .map(|button| {
                button.active = false;
                Event::end(button.category.clone(), time)
            })
            .collect()
    }

    /// Switches off a single active button without producing an event. The caller is responsible
    /// for recording the END itself.
    pub(crate) fn release(&mut self, name: &str) -> Option<Category> {
        let button = self.buttons.iter_mut().find(|v| v.category.as_str() == name)?;
        if !button.active {
            return None;
        }
        button.active = false;
        Some(button.category.clone())
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.buttons
            .iter()
            .any(|v| v.active && v.category.as_str() == name)
    }

    pub fn active(&self) -> impl Iterator<Item = &Category> {
        self.buttons.iter().filter(|v| v.active).map(|v| &v.category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.buttons.iter().map(|v| &v.category)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.buttons
            .iter()
            .position(|v| v.category.as_str() == name)
    }
}
