// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Span instrumentation of the layout passes.
//!
//!   cargo test -p understory_virtual_wrap --features tracing --test tracing_spans

#![cfg(feature = "tracing")]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use kurbo::{Rect, Size};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use understory_virtual_wrap::{
    CacheLength, CacheUnit, ContainerGenerator, GroupConstraints, LayoutCx, VirtualWrapPanel,
    WrapConfig,
};

#[derive(Debug, Clone)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
}

#[derive(Default)]
struct Capture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        self.spans.lock().unwrap().push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let message = visitor
            .0
            .into_iter()
            .find(|(name, _)| name == "message")
            .map(|(_, value)| value)
            .unwrap_or_default();
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
        });
    }
}

fn with_capture(f: impl FnOnce()) -> (Vec<CapturedSpan>, Vec<CapturedEvent>) {
    let layer = Capture::default();
    let spans = layer.spans.clone();
    let events = layer.events.clone();
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let spans = spans.lock().unwrap().clone();
    let events = events.lock().unwrap().clone();
    (spans, events)
}

struct Squares;

impl ContainerGenerator for Squares {
    type Item = u8;
    type Container = ();

    fn generate_container(&mut self, _index: usize) {}

    fn prepare_container(&mut self, _container: &mut (), _index: usize, _item: &u8) {}

    fn measure_container(&mut self, _container: &mut (), _available: Size) -> Size {
        Size::new(50.0, 50.0)
    }

    fn arrange_container(&mut self, _container: &mut (), _rect: Rect) {}
}

#[test]
fn measure_and_arrange_open_spans() {
    let items: Vec<u8> = vec![0; 100];
    let (spans, _) = with_capture(|| {
        let mut generator = Squares;
        let mut panel = VirtualWrapPanel::new(WrapConfig::new());
        let size = Size::new(200.0, 400.0);
        panel.measure(size, LayoutCx::new(&items, &mut generator));
        panel.arrange(size, &mut generator);
    });

    let measure = spans.iter().find(|s| s.name == "wrap_measure");
    let measure = measure.expect("wrap_measure span");
    assert_eq!(measure.fields.get("items").map(String::as_str), Some("100"));
    assert_eq!(measure.fields.get("grouped").map(String::as_str), Some("false"));

    let arrange = spans.iter().find(|s| s.name == "wrap_arrange");
    let arrange = arrange.expect("wrap_arrange span");
    assert!(arrange.fields.contains_key("realized"), "{arrange:?}");
}

#[test]
fn page_cache_inside_group_warns() {
    let items: Vec<u8> = vec![0; 100];
    let (_, events) = with_capture(|| {
        let mut generator = Squares;
        let mut panel = VirtualWrapPanel::new(WrapConfig::new());
        let group = GroupConstraints {
            viewport: Rect::new(0.0, 0.0, 200.0, 200.0),
            cache_length: CacheLength::uniform(1.0),
            cache_unit: CacheUnit::Page,
            header_size: Size::new(200.0, 20.0),
        };
        panel.measure(
            Size::new(200.0, f64::INFINITY),
            LayoutCx::new(&items, &mut generator).with_group(&group),
        );
    });

    assert!(
        events
            .iter()
            .any(|e| e.level == tracing::Level::WARN && e.message.contains("page cache")),
        "{events:?}"
    );
}
