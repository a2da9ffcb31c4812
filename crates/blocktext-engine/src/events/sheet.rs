use std::rc::Rc;

use crate::delta::{AttributeMap, AttributeValue, LineType};

use super::endpoint::Endpoint;
use super::owner::OwnerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SheetEventType {
    SwitchLineTypeInSelection,
    ApplyTextTransformToSelection,
    SelectedLineTypeChange,
    SelectedTextAttributesChange,
}

/// Signals exchanged between the host UI and the document.
///
/// The first two are requests from the host; the last two report the outcome
/// back to it.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetEvent {
    SwitchLineTypeInSelection(LineType),
    ApplyTextTransformToSelection {
        attribute_name: String,
        attribute_value: AttributeValue,
    },
    SelectedLineTypeChange(LineType),
    SelectedTextAttributesChange(AttributeMap),
}

impl SheetEvent {
    pub fn event_type(&self) -> SheetEventType {
        match self {
            SheetEvent::SwitchLineTypeInSelection(_) => SheetEventType::SwitchLineTypeInSelection,
            SheetEvent::ApplyTextTransformToSelection { .. } => {
                SheetEventType::ApplyTextTransformToSelection
            }
            SheetEvent::SelectedLineTypeChange(_) => SheetEventType::SelectedLineTypeChange,
            SheetEvent::SelectedTextAttributesChange(_) => {
                SheetEventType::SelectedTextAttributesChange
            }
        }
    }
}

/// The host's signal source: typed registration and emission of
/// [`SheetEvent`]s over a shared [`Endpoint`].
///
/// Cloning yields another handle to the same endpoint.
#[derive(Debug, Clone, Default)]
pub struct SheetEventDomain {
    endpoint: Rc<Endpoint<SheetEventType, SheetEvent>>,
}

impl SheetEventDomain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_switch_line_type_in_selection_listener(
        &self,
        owner: OwnerId,
        listener: impl Fn(&LineType) + 'static,
    ) {
        self.endpoint.subscribe(
            owner,
            SheetEventType::SwitchLineTypeInSelection,
            move |event| {
                if let SheetEvent::SwitchLineTypeInSelection(line_type) = event {
                    listener(line_type);
                }
            },
        );
    }

    pub fn add_apply_text_transform_to_selection_listener(
        &self,
        owner: OwnerId,
        listener: impl Fn(&str, &AttributeValue) + 'static,
    ) {
        self.endpoint.subscribe(
            owner,
            SheetEventType::ApplyTextTransformToSelection,
            move |event| {
                if let SheetEvent::ApplyTextTransformToSelection {
                    attribute_name,
                    attribute_value,
                } = event
                {
                    listener(attribute_name, attribute_value);
                }
            },
        );
    }

    pub fn add_selected_line_type_change_listener(
        &self,
        owner: OwnerId,
        listener: impl Fn(&LineType) + 'static,
    ) {
        self.endpoint
            .subscribe(owner, SheetEventType::SelectedLineTypeChange, move |event| {
                if let SheetEvent::SelectedLineTypeChange(line_type) = event {
                    listener(line_type);
                }
            });
    }

    pub fn add_selected_text_attributes_change_listener(
        &self,
        owner: OwnerId,
        listener: impl Fn(&AttributeMap) + 'static,
    ) {
        self.endpoint.subscribe(
            owner,
            SheetEventType::SelectedTextAttributesChange,
            move |event| {
                if let SheetEvent::SelectedTextAttributesChange(attributes) = event {
                    listener(attributes);
                }
            },
        );
    }

    /// Ask the document to change the type of the selected lines.
    pub fn switch_line_type_in_selection(&self, line_type: LineType) {
        self.emit(SheetEvent::SwitchLineTypeInSelection(line_type));
    }

    /// Ask the document to set an attribute on the selected text.
    pub fn apply_text_transform_to_selection(
        &self,
        attribute_name: impl Into<String>,
        attribute_value: AttributeValue,
    ) {
        self.emit(SheetEvent::ApplyTextTransformToSelection {
            attribute_name: attribute_name.into(),
            attribute_value,
        });
    }

    pub fn notify_selected_line_type_change(&self, line_type: LineType) {
        self.emit(SheetEvent::SelectedLineTypeChange(line_type));
    }

    pub fn notify_selected_text_attributes_change(&self, attributes: AttributeMap) {
        self.emit(SheetEvent::SelectedTextAttributesChange(attributes));
    }

    pub fn release(&self, owner: OwnerId) {
        self.endpoint.release(owner);
    }

    pub fn release_all(&self) {
        self.endpoint.release_all();
    }

    pub fn listener_count(&self, event_type: SheetEventType) -> usize {
        self.endpoint.listener_count(&event_type)
    }

    fn emit(&self, event: SheetEvent) {
        self.endpoint.publish(&event.event_type(), &event);
    }
}
