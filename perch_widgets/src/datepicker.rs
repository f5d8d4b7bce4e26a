// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Date picker display: keeps a trigger's label in sync with the ISO date in a
//! hidden input, and closes the hosting popover once a date is chosen.

use core::str::FromStr;

use chrono::NaiveDate;
use perch_dom::{Document, ElementId, ID_ATTR};
use perch_popover::{Popovers, attrs as popover_attrs};
use tracing::debug;

use crate::error::{Result, WidgetError};
use crate::markup::{self, VALUE};

/// Attribute names used by the date picker.
pub mod attrs {
    /// On the trigger: `"true"` marks a date picker.
    pub const ROOT: &str = "data-datepicker";
    /// On the label element inside the trigger.
    pub const DISPLAY: &str = "data-datepicker-display";
    /// On the trigger: one of `locale-short`, `locale-medium`, `locale-long`, `locale-full`.
    pub const DISPLAY_FORMAT: &str = "data-datepicker-display-format";
    /// On the trigger: BCP 47 language tag, `en-US` when absent.
    pub const LOCALE_TAG: &str = "data-datepicker-locale-tag";
    /// On the trigger: label shown without a valid date.
    pub const PLACEHOLDER: &str = "data-datepicker-placeholder";
    /// On the hidden input holding the ISO date, inside the popover content.
    pub const HIDDEN_INPUT: &str = "data-calendar-hidden-input";
    /// On the trigger: `id` of the popover content holding the calendar.
    pub const ARIA_CONTROLS: &str = "aria-controls";
    /// Set on the trigger once bound.
    pub const INITIALIZED: &str = "data-datepicker-initialized";
}

const DEFAULT_LOCALE: &str = "en-US";
const DEFAULT_PLACEHOLDER: &str = "Select a date";
const MUTED: &str = "text-muted-foreground";

/// Parse a strict `YYYY-MM-DD` date, rejecting dates that do not exist.
///
/// ```
/// use perch_widgets::datepicker::parse_iso_date;
///
/// assert!(parse_iso_date("2024-02-29").is_ok());
/// assert!(parse_iso_date("2023-02-29").is_err());
/// assert!(parse_iso_date("2024-2-9").is_err());
/// ```
pub fn parse_iso_date(s: &str) -> Result<NaiveDate> {
    let invalid = || WidgetError::InvalidDate(s.to_owned());
    let b = s.as_bytes();
    let shaped = b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b.iter()
            .enumerate()
            .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit());
    if !shaped {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| invalid())
}

/// How much of a date the label spells out.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DisplayFormat {
    /// `3/5/24`
    Short,
    /// `Mar 5, 2024`
    #[default]
    Medium,
    /// `March 5, 2024`
    Long,
    /// `Tuesday, March 5, 2024`
    Full,
}

impl FromStr for DisplayFormat {
    type Err = core::convert::Infallible;

    /// Unknown names fall back to [`DisplayFormat::Medium`].
    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        Ok(match s.trim() {
            "locale-short" => Self::Short,
            "locale-long" => Self::Long,
            "locale-full" => Self::Full,
            _ => Self::Medium,
        })
    }
}

/// Render `date` for `locale`.
///
/// English locales get month and weekday names; any other locale gets the
/// ISO form.
pub fn format_date(date: NaiveDate, format: DisplayFormat, locale: &str) -> String {
    let english = locale
        .split(['-', '_'])
        .next()
        .is_some_and(|lang| lang.eq_ignore_ascii_case("en"));
    if !english {
        return date.format("%Y-%m-%d").to_string();
    }
    let pattern = match format {
        DisplayFormat::Short => "%-m/%-d/%y",
        DisplayFormat::Medium => "%b %-d, %Y",
        DisplayFormat::Long => "%B %-d, %Y",
        DisplayFormat::Full => "%A, %B %-d, %Y",
    };
    date.format(pattern).to_string()
}

/// A bound date picker trigger.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DatePicker {
    trigger: ElementId,
    display: ElementId,
    input: ElementId,
}

impl DatePicker {
    /// Resolve the label and hidden input of the date picker at `trigger`.
    ///
    /// The hidden input is `#<trigger id>-calendar-instance-hidden` when it
    /// exists, otherwise the [`attrs::HIDDEN_INPUT`] element inside the
    /// content named by `aria-controls`.
    pub fn bind(doc: &Document, trigger: ElementId) -> Result<Self> {
        let missing = |part| WidgetError::MissingElement {
            widget: "datepicker",
            part,
        };
        let display = markup::find_attr(doc, trigger, attrs::DISPLAY).ok_or(missing("display"))?;
        let by_id = doc
            .attribute(trigger, ID_ATTR)
            .and_then(|id| doc.element_by_id(&format!("{id}-calendar-instance-hidden")));
        let input = by_id
            .or_else(|| {
                let content = doc.element_by_id(doc.attribute(trigger, attrs::ARIA_CONTROLS)?)?;
                markup::find_attr(doc, content, attrs::HIDDEN_INPUT)
            })
            .ok_or(missing("hidden input"))?;
        Ok(Self {
            trigger,
            display,
            input,
        })
    }

    /// The trigger button.
    pub fn trigger(&self) -> ElementId {
        self.trigger
    }

    /// The label element.
    pub fn display(&self) -> ElementId {
        self.display
    }

    /// Currently selected date, if the hidden input holds a valid one.
    pub fn value(&self, doc: &Document) -> Option<NaiveDate> {
        parse_iso_date(markup::input_value(doc, self.input)).ok()
    }

    /// Configured display format.
    pub fn format(&self, doc: &Document) -> DisplayFormat {
        doc.attribute(self.trigger, attrs::DISPLAY_FORMAT)
            .unwrap_or("")
            .parse()
            .unwrap_or_default()
    }

    /// Render the hidden input's date into the label, or the placeholder when
    /// it is empty or invalid.
    pub fn update_display(&self, doc: &mut Document) {
        match self.value(doc) {
            Some(date) => {
                let locale = doc.attribute(self.trigger, attrs::LOCALE_TAG).unwrap_or(DEFAULT_LOCALE);
                let text = format_date(date, self.format(doc), locale);
                doc.set_text(self.display, text);
                doc.remove_class(self.display, MUTED);
            }
            None => self.show_placeholder(doc),
        }
    }

    /// Choose `date`: store it, relabel, and close the popover hosting the calendar.
    pub fn select(&self, doc: &mut Document, popovers: &mut Popovers, date: NaiveDate) {
        doc.set_attribute(self.input, VALUE, date.format("%Y-%m-%d").to_string());
        self.update_display(doc);
        let host = doc
            .closest(self.trigger, popover_attrs::TRIGGER)
            .and_then(|t| doc.attribute(t, popover_attrs::TRIGGER))
            .or_else(|| doc.attribute(self.trigger, attrs::ARIA_CONTROLS))
            .map(str::to_owned);
        match host {
            Some(id) => popovers.close(doc, &id, false),
            None => debug!(trigger = ?self.trigger, "date picker has no hosting popover"),
        }
    }

    /// Clear the date, as on form reset.
    pub fn reset(&self, doc: &mut Document) {
        doc.set_attribute(self.input, VALUE, "");
        self.show_placeholder(doc);
    }

    fn show_placeholder(&self, doc: &mut Document) {
        let placeholder = doc
            .attribute(self.trigger, attrs::PLACEHOLDER)
            .unwrap_or(DEFAULT_PLACEHOLDER)
            .to_owned();
        doc.set_text(self.display, placeholder);
        doc.add_class(self.display, MUTED);
    }
}

/// Bind every date picker under `root` (inclusive) not yet initialised and
/// render its initial label.
pub fn init(doc: &mut Document, root: ElementId) -> Vec<DatePicker> {
    let triggers = doc.query(root, |d, e| {
        markup::flag(d, e, attrs::ROOT) && !d.has_attribute(e, attrs::INITIALIZED)
    });
    let mut bound = Vec::new();
    for trigger in triggers {
        doc.set_attribute(trigger, attrs::INITIALIZED, "true");
        match DatePicker::bind(doc, trigger) {
            Ok(picker) => {
                picker.update_display(doc);
                bound.push(picker);
            }
            Err(err) => debug!(?trigger, %err, "skipping date picker"),
        }
    }
    bound
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;
    use perch_dom::ElementData;
    use perch_popover::EngineOptions;
    use perch_position::Floating;

    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parsing_is_strict() {
        assert_eq!(parse_iso_date("2024-03-05"), Ok(ymd(2024, 3, 5)));
        for bad in ["", "2024-13-01", "2024-04-31", "24-03-05", "2024/03/05", "2024-03-05T00", "２024-03-05"] {
            assert_eq!(
                parse_iso_date(bad),
                Err(WidgetError::InvalidDate(bad.to_owned())),
                "{bad:?} must be rejected"
            );
        }
    }

    #[test]
    fn english_formats() {
        let d = ymd(2024, 3, 5);
        assert_eq!(format_date(d, DisplayFormat::Short, "en-US"), "3/5/24");
        assert_eq!(format_date(d, DisplayFormat::Medium, "en-US"), "Mar 5, 2024");
        assert_eq!(format_date(d, DisplayFormat::Long, "en"), "March 5, 2024");
        assert_eq!(format_date(d, DisplayFormat::Full, "EN_us"), "Tuesday, March 5, 2024");
        assert_eq!(format_date(d, DisplayFormat::Long, "de-DE"), "2024-03-05");
    }

    #[test]
    fn unknown_format_is_medium() {
        assert_eq!("locale-full".parse::<DisplayFormat>(), Ok(DisplayFormat::Full));
        assert_eq!("whatever".parse::<DisplayFormat>(), Ok(DisplayFormat::Medium));
    }

    struct Fixture {
        doc: Document,
        popovers: Popovers,
        picker: DatePicker,
        input: ElementId,
    }

    fn fixture(initial: &str) -> Fixture {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 800.0, 600.0));
        let body = doc.body();
        let trigger = doc.insert(
            Some(body),
            ElementData::new("button").with_bounds(Rect::new(10.0, 10.0, 200.0, 40.0)),
        );
        doc.set_attribute(trigger, ID_ATTR, "due");
        doc.set_attribute(trigger, attrs::ROOT, "true");
        doc.set_attribute(trigger, attrs::DISPLAY_FORMAT, "locale-long");
        doc.set_attribute(trigger, attrs::ARIA_CONTROLS, "due-popover");
        doc.set_attribute(trigger, popover_attrs::TRIGGER, "due-popover");
        let label = doc.insert(Some(trigger), ElementData::new("span"));
        doc.set_attribute(label, attrs::DISPLAY, "");

        let content = doc.insert(
            Some(body),
            ElementData::default().with_bounds(Rect::new(0.0, 0.0, 250.0, 250.0)),
        );
        doc.set_attribute(content, ID_ATTR, "due-popover");
        doc.set_style(content, "display", "none");
        let input = doc.insert(Some(content), ElementData::new("input"));
        doc.set_attribute(input, attrs::HIDDEN_INPUT, "");
        doc.set_attribute(input, VALUE, initial);

        let mut popovers = Popovers::with_engine(EngineOptions::default(), Floating);
        popovers.init(&mut doc, body);
        let picker = init(&mut doc, body)[0];
        Fixture {
            doc,
            popovers,
            picker,
            input,
        }
    }

    #[test]
    fn initial_label_follows_hidden_input() {
        let f = fixture("2025-12-24");
        assert_eq!(f.doc.text(f.picker.display()), "December 24, 2025");
        assert!(!f.doc.has_class(f.picker.display(), MUTED));

        let f = fixture("2025-02-30");
        assert_eq!(f.doc.text(f.picker.display()), DEFAULT_PLACEHOLDER);
        assert!(f.doc.has_class(f.picker.display(), MUTED));
    }

    #[test]
    fn selecting_closes_the_popover() {
        let mut f = fixture("");
        f.popovers.open(&mut f.doc, "due-popover");
        f.picker.select(&mut f.doc, &mut f.popovers, ymd(2024, 7, 4));
        assert_eq!(f.doc.attribute(f.input, VALUE), Some("2024-07-04"));
        assert_eq!(f.doc.text(f.picker.display()), "July 4, 2024");
        assert!(!f.popovers.is_open("due-popover"));
    }

    #[test]
    fn reset_restores_placeholder() {
        let mut f = fixture("2024-01-01");
        f.doc.set_attribute(f.picker.trigger(), attrs::PLACEHOLDER, "Pick a day");
        f.picker.reset(&mut f.doc);
        assert_eq!(f.picker.value(&f.doc), None);
        assert_eq!(f.doc.text(f.picker.display()), "Pick a day");
    }
}
