//! Native-side counterpart data.
//!
//! Every element instance owns exactly one counterpart handle. The host
//! writes layout results into the counterpart while applying a flushed
//! batch; the owning instance reads them back after forcing a flush. A
//! handle clone carried by a [`Command`](crate::commands::Command) is an
//! addressing reference for the host and is dropped with the batch; the
//! instance remains the unique owner and the counterpart is released when
//! the instance is dropped.

use std::cell::Cell;
use std::rc::Rc;

/// Host-computed box metrics readable through an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayoutMetric {
    OffsetLeft,
    OffsetTop,
    OffsetWidth,
    OffsetHeight,
    ClientWidth,
    ClientHeight,
    ClientTop,
    ClientLeft,
    ScrollTop,
    ScrollLeft,
    ScrollWidth,
    ScrollHeight,
}

impl LayoutMetric {
    const COUNT: usize = 12;

    fn index(self) -> usize {
        self as usize
    }
}

/// Layout result rectangle, mirrored from the host.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingClientRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Per-element native counterpart for generic layout reads.
#[derive(Debug, Default)]
pub struct NativeElementSurface {
    metrics: [Cell<f64>; LayoutMetric::COUNT],
    rect: Cell<BoundingClientRect>,
}

impl NativeElementSurface {
    pub fn metric(&self, metric: LayoutMetric) -> f64 {
        self.metrics[metric.index()].get()
    }

    /// Host-side write while applying a batch.
    pub fn set_metric(&self, metric: LayoutMetric, value: f64) {
        self.metrics[metric.index()].set(value);
    }

    pub fn bounding_client_rect(&self) -> BoundingClientRect {
        self.rect.get()
    }

    pub fn set_bounding_client_rect(&self, rect: BoundingClientRect) {
        self.rect.set(rect);
    }
}

/// Native counterpart for an image element: intrinsic and laid-out sizes.
#[derive(Debug, Default)]
pub struct NativeImageElement {
    width: Cell<f64>,
    height: Cell<f64>,
    natural_width: Cell<f64>,
    natural_height: Cell<f64>,
}

impl NativeImageElement {
    pub fn image_width(&self) -> f64 {
        self.width.get()
    }

    pub fn image_height(&self) -> f64 {
        self.height.get()
    }

    pub fn image_natural_width(&self) -> f64 {
        self.natural_width.get()
    }

    pub fn image_natural_height(&self) -> f64 {
        self.natural_height.get()
    }

    /// Host-side writes while applying a batch.
    pub fn set_width(&self, width: f64) {
        self.width.set(width);
    }

    pub fn set_height(&self, height: f64) {
        self.height.set(height);
    }

    pub fn set_natural_size(&self, width: f64, height: f64) {
        self.natural_width.set(width);
        self.natural_height.set(height);
    }
}

/// Type-erased counterpart reference carried by create commands so the host
/// can bind the target id to the block it will be writing into.
#[derive(Clone, Debug)]
pub enum NativeHandle {
    Element(Rc<NativeElementSurface>),
    Image(Rc<NativeImageElement>),
}

impl NativeHandle {
    pub fn as_element(&self) -> Option<&Rc<NativeElementSurface>> {
        match self {
            NativeHandle::Element(surface) => Some(surface),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&Rc<NativeImageElement>> {
        match self {
            NativeHandle::Image(image) => Some(image),
            _ => None,
        }
    }
}

/// One-shot UTF-16 buffer handed over by the host. Decoding consumes the
/// buffer: the transfer happens at most once and the allocation is released
/// as soon as the units have been read.
#[derive(Debug)]
pub struct NativeString {
    units: Vec<u16>,
}

impl NativeString {
    pub fn new(units: Vec<u16>) -> Self {
        Self { units }
    }

    pub fn from_str(value: &str) -> Self {
        Self {
            units: value.encode_utf16().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn into_units(self) -> Vec<u16> {
        self.units
    }
}

/// Event record arriving from the host (native-origin dispatch into script).
#[derive(Debug)]
pub struct NativeEventRecord {
    pub event_type: NativeString,
    pub bubbles: bool,
    pub cancelable: bool,
}

/// Custom-event record: the base event plus an opaque detail payload.
#[derive(Debug)]
pub struct NativeCustomEventRecord {
    pub event: NativeEventRecord,
    pub detail: NativeString,
}
