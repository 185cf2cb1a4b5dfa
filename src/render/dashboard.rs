use crate::config::AppConfig;
use crate::fetch::FetchedData;
use crate::model::{DashboardConfig, Widget, WidgetSpec};
use crate::model::uri::UriExtractor;
use crate::render::classify::classify;
use crate::render::document::{DocumentMeta, assemble};
use crate::render::format::format_timestamp;
use crate::render::{RenderContext, RenderResult, RendererSet, WidgetDoc};
use crate::resolve::DataResolver;
use crate::resolve::style::apply_house_style;
use crate::resolve::transform::TransformRegistry;
use crate::typedoc::roles::infer_field_roles;
use crate::typedoc::{complete_fields, merge_fields, parse_typedoc};
use chrono::{DateTime, FixedOffset};
use std::sync::Arc;
use tracing::{debug, warn};

/// Per-widget pipeline: decode, resolve, infer fields, classify, render.
pub struct DashboardRenderer {
    config: Arc<AppConfig>,
    extractor: Arc<UriExtractor>,
    resolver: DataResolver,
    renderers: RendererSet,
}

impl DashboardRenderer {
    pub fn new(config: Arc<AppConfig>, extractor: Arc<UriExtractor>, transforms: Arc<TransformRegistry>) -> Self {
        let resolver = DataResolver::new(extractor.clone(), transforms);
        Self { config, extractor, resolver, renderers: RendererSet::standard() }
    }

    pub fn with_renderers(mut self, renderers: RendererSet) -> Self {
        self.renderers = renderers;
        self
    }

    /// Typedocs fetched for the URIs a widget references, in reference order.
    fn widget_docs(&self, chart_data: &str, fetched: &FetchedData) -> Vec<WidgetDoc> {
        self.extractor
            .extract(chart_data)
            .iter()
            .filter_map(|uri| {
                let typedoc = fetched.typedocs.get(uri)?;
                let parsed = self.extractor.parse(uri)?;
                Some(WidgetDoc { node: parsed.node_name, output: parsed.output_name, typedoc: typedoc.clone() })
            })
            .collect()
    }

    /// `None` when the widget has nothing to show or no presentation fits.
    pub fn render_widget(&self, index: usize, widget: &Widget, widget_count: usize, fetched: &FetchedData) -> Option<RenderResult> {
        let chart_data = widget.chart_data.as_deref()?;
        let spec = match WidgetSpec::from_chart_data(chart_data, &self.extractor) {
            Ok(Some(spec)) => spec,
            Ok(None) => return None,
            Err(e) => {
                warn!(widget = %widget.name, error = %e, "Skipping widget with malformed chart data");
                return None;
            }
        };

        let docs = self.widget_docs(chart_data, fetched);
        let parsed_docs: Vec<_> = docs.iter().filter_map(|d| parse_typedoc(Some(d.typedoc.as_str()))).collect();
        let documented = merge_fields(&parsed_docs);

        let data = self.resolver.resolve_source(spec.data(), &fetched.series);
        let fields = complete_fields(&documented, data.as_array().map(Vec::as_slice).unwrap_or(&[]));
        let roles = infer_field_roles(&fields);

        let Some(classification) = classify(&spec, &data, &fields, widget_count) else {
            warn!(widget = %widget.name, "⚠️ No presentation fits widget data, dropping it");
            return None;
        };
        debug!(widget = %widget.name, presentation = ?classification.presentation, span = classification.span, "Classified widget");

        let mut props = self.resolver.resolve_props(spec.props(), &fetched.series);
        apply_house_style(&mut props);

        let offset = self.config.offset();
        let ctx = RenderContext {
            index,
            widget,
            presentation: classification.presentation,
            span: classification.span,
            props: &props,
            data: &data,
            fields: &fields,
            roles: &roles,
            docs: &docs,
            offset,
            timestamp: format_timestamp(widget.create_time.as_ref(), &offset),
        };

        let renderer = self.renderers.get(classification.presentation.renderer())?;
        Some(renderer.render(&ctx))
    }

    pub fn render_widgets(&self, config: &DashboardConfig, fetched: &FetchedData) -> Vec<RenderResult> {
        let count = config.config.len();
        config
            .config
            .iter()
            .enumerate()
            .filter_map(|(idx, widget)| self.render_widget(idx, widget, count, fetched))
            .collect()
    }

    pub fn render_document(&self, config: &DashboardConfig, fetched: &FetchedData, generated_at: DateTime<FixedOffset>) -> String {
        let fragments = self.render_widgets(config, fetched);
        let meta = DocumentMeta {
            title: config.title().to_string(),
            description: config.description.clone(),
            generated_at: generated_at.format("%Y/%m/%d %H:%M:%S").to_string(),
            chart_library_url: self.config.chart_library_url.clone(),
        };
        assemble(&meta, &fragments)
    }
}
