use crate::audio::beat::BeatReading;
use crate::foundation::core::{Affine, Canvas, Vec2};
use crate::foundation::error::BeatframeResult;
use crate::particles::system::Particle;
use crate::render::blur::{blur_params, blur_rgba8_premul};
use crate::render::composite::{apply_letterbox, apply_vignette, over_in_place, over_offset_in_place};
use crate::render::cpu::{FrameRGBA, affine_to_cpu, bezpath_to_cpu, canvas_u16, clear_pixmap, new_pixmap};
use crate::render::image::{ImageStore, cover_fit};
use crate::render::spectrum::{self, Paint, SpectrumFrame};
use crate::render::text::{FontBook, TextBrush, TextLine, draw_line};
use crate::scene::config::{LayoutMode, SceneConfig};
use kurbo::Shape;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Canonical letterbox bar height.
const LETTERBOX_PX: f64 = 108.0;
/// Opacity of the blurred spectrum copy drawn beneath the crisp one.
const BLOOM_OPACITY: f32 = 0.85;

/// Renderer tunables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RendererOpts {
    /// Bass intensity (0..1) above which the camera shakes.
    pub shake_threshold: f32,
    /// Seed of the shake random source.
    pub seed: u64,
}

impl Default for RendererOpts {
    fn default() -> Self {
        Self {
            shake_threshold: 0.7,
            seed: 0x5eed,
        }
    }
}

/// Everything one frame is drawn from.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput<'a> {
    /// Scene snapshot for this tick.
    pub config: &'a SceneConfig,
    /// Frequency snapshot, `None` before analysis data exists.
    pub snapshot: Option<&'a [u8]>,
    /// Beat reading for this tick.
    pub beat: BeatReading,
    /// Live particles in canonical coordinates.
    pub particles: &'a [Particle],
    /// Playback time in seconds (drives rotation and color cycling).
    pub time_secs: f64,
}

struct BackgroundCache {
    key: String,
    canvas: Canvas,
    blur: Option<(u32, f32)>,
    revision: u64,
    rgba8_premul: Vec<u8>,
}

/// Per-frame compositor drawing the scene in fixed z-order onto a premultiplied RGBA8 canvas.
///
/// Rendering never fails: a layer whose assets are missing or whose drawing errors is skipped for
/// that frame.
pub struct FrameRenderer {
    opts: RendererOpts,
    canvas: Canvas,
    frame: vello_cpu::Pixmap,
    layer: vello_cpu::Pixmap,
    images: ImageStore,
    fonts: FontBook,
    background: Option<BackgroundCache>,
    shake_rng: StdRng,
}

impl std::fmt::Debug for FrameRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameRenderer")
            .field("canvas", &self.canvas)
            .field("images", &self.images)
            .field("fonts", &self.fonts)
            .finish_non_exhaustive()
    }
}

impl FrameRenderer {
    /// Create a renderer for `canvas`.
    pub fn new(canvas: Canvas, opts: RendererOpts) -> BeatframeResult<Self> {
        Ok(Self {
            opts,
            canvas,
            frame: new_pixmap(canvas)?,
            layer: new_pixmap(canvas)?,
            images: ImageStore::new(),
            fonts: FontBook::new(),
            background: None,
            shake_rng: StdRng::seed_from_u64(opts.seed),
        })
    }

    /// Current canvas size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Reallocate the surfaces for a new size. The previous frame is discarded.
    pub fn resize(&mut self, canvas: Canvas) -> BeatframeResult<()> {
        if canvas == self.canvas {
            return Ok(());
        }
        self.frame = new_pixmap(canvas)?;
        self.layer = new_pixmap(canvas)?;
        self.background = None;
        self.canvas = canvas;
        tracing::debug!(width = canvas.width, height = canvas.height, "canvas resized");
        Ok(())
    }

    /// Scene images.
    pub fn images_mut(&mut self) -> &mut ImageStore {
        &mut self.images
    }

    /// Fonts for the text overlay.
    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    /// Premultiplied RGBA8 pixels of the last frame.
    pub fn pixels(&self) -> &[u8] {
        self.frame.data_as_u8_slice()
    }

    /// Copy of the last frame.
    pub fn frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.pixels().to_vec(),
            premultiplied: true,
        }
    }

    /// Draw one frame.
    pub fn render(&mut self, input: &FrameInput<'_>) {
        let cfg = input.config.sanitized();
        let scale = self.canvas.scale_factor();

        clear_pixmap(&mut self.frame, cfg.background_color.to_premul().to_array());

        let shake = self.shake_offset(&cfg, input);

        match cfg.background_image.as_deref() {
            Some(key) => {
                if let Err(e) = self.draw_background_image(key, &cfg, shake) {
                    tracing::trace!(error = %e, "background image layer skipped");
                }
            }
            None => self.background = None,
        }

        if cfg.show_particles
            && !input.particles.is_empty()
            && let Err(e) = self.draw_particles(input.particles, shake)
        {
            tracing::trace!(error = %e, "particle layer skipped");
        }

        match input.snapshot {
            Some(snapshot) if cfg.show_bars => {
                if let Err(e) = self.draw_spectrum(&cfg, snapshot, input, shake) {
                    tracing::trace!(error = %e, "spectrum layer skipped");
                }
            }
            None if cfg.show_bars => tracing::trace!("no analysis data, spectrum skipped"),
            _ => {}
        }

        if let Err(e) = self.draw_foreground(&cfg, input.beat.is_beat, shake) {
            tracing::trace!(error = %e, "foreground layer skipped");
        }

        let (w, h) = (self.canvas.width, self.canvas.height);
        let data = self.frame.data_as_u8_slice_mut();
        apply_vignette(data, w, h, cfg.vignette);
        if cfg.cinematic_bars {
            apply_letterbox(data, w, h, (LETTERBOX_PX * scale).round() as u32);
        }
    }

    fn shake_offset(&mut self, cfg: &SceneConfig, input: &FrameInput<'_>) -> Vec2 {
        if input.snapshot.is_none()
            || cfg.shake_strength <= 0.0
            || input.beat.intensity <= self.opts.shake_threshold
        {
            return Vec2::ZERO;
        }
        let mag = cfg.shake_strength * f64::from(input.beat.intensity) * self.canvas.scale_factor();
        Vec2::new(
            self.shake_rng.random_range(-1.0..=1.0) * mag,
            self.shake_rng.random_range(-1.0..=1.0) * mag,
        )
    }

    fn draw_background_image(&mut self, key: &str, cfg: &SceneConfig, shake: Vec2) -> BeatframeResult<()> {
        let blur = blur_params(cfg.background_blur * self.canvas.scale_factor());
        let revision = self.images.revision();
        let fresh = self.background.as_ref().is_some_and(|c| {
            c.key == key && c.canvas == self.canvas && c.blur == blur && c.revision == revision
        });

        if !fresh {
            self.background = None;
            let Some((img, paint)) = self.images.get_or_load(key) else {
                tracing::trace!(key, "background image unavailable");
                return Ok(());
            };
            let (iw, ih) = (f64::from(img.width), f64::from(img.height));
            let paint = paint.clone();
            let (s, ox, oy) = cover_fit(
                iw,
                ih,
                f64::from(self.canvas.width),
                f64::from(self.canvas.height),
            );

            render_layer(&mut self.layer, self.canvas, |ctx| {
                ctx.set_transform(affine_to_cpu(Affine::translate((ox, oy)) * Affine::scale(s)));
                ctx.set_paint(paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
            })?;

            let mut rgba8_premul = self.layer.data_as_u8_slice().to_vec();
            if let Some((radius, sigma)) = blur {
                rgba8_premul =
                    blur_rgba8_premul(&rgba8_premul, self.canvas.width, self.canvas.height, radius, sigma)?;
            }
            self.background = Some(BackgroundCache {
                key: key.to_owned(),
                canvas: self.canvas,
                blur,
                revision,
                rgba8_premul,
            });
        }

        if let Some(cache) = &self.background {
            over_offset_in_place(
                self.frame.data_as_u8_slice_mut(),
                &cache.rgba8_premul,
                self.canvas.width,
                (shake.x.round() as i32, shake.y.round() as i32),
                cfg.background_opacity as f32,
            )?;
        }
        Ok(())
    }

    fn draw_particles(&mut self, particles: &[Particle], shake: Vec2) -> BeatframeResult<()> {
        let xf = Affine::translate(self.canvas.center().to_vec2() + shake)
            * Affine::scale(self.canvas.scale_factor())
            * Affine::translate(-Canvas::CANONICAL.center().to_vec2());

        render_layer(&mut self.layer, self.canvas, |ctx| {
            ctx.set_transform(affine_to_cpu(xf));
            for p in particles {
                if p.radius <= 0.0 || p.opacity() <= 0.0 {
                    continue;
                }
                let color = p.color.with_opacity(p.opacity());
                ctx.set_paint(color.to_paint());
                let circle = kurbo::Circle::new((p.x, p.y), p.radius).to_path(0.1);
                ctx.fill_path(&bezpath_to_cpu(&circle));
            }
        })?;
        over_in_place(self.frame.data_as_u8_slice_mut(), self.layer.data_as_u8_slice(), 1.0)
    }

    fn draw_spectrum(
        &mut self,
        cfg: &SceneConfig,
        snapshot: &[u8],
        input: &FrameInput<'_>,
        shake: Vec2,
    ) -> BeatframeResult<()> {
        let shapes = spectrum::build(
            cfg,
            snapshot,
            SpectrumFrame {
                canvas: self.canvas,
                time_secs: input.time_secs,
                beat: input.beat.is_beat,
            },
        );
        if shapes.is_empty() {
            return Ok(());
        }

        render_layer(&mut self.layer, self.canvas, |ctx| {
            ctx.set_transform(affine_to_cpu(Affine::translate(shake)));
            for shape in &shapes {
                ctx.set_paint(shape.color.to_paint());
                let path = bezpath_to_cpu(&shape.path);
                match shape.paint {
                    Paint::Fill => ctx.fill_path(&path),
                    Paint::Stroke(width) => {
                        ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
                        ctx.stroke_path(&path);
                    }
                }
            }
        })?;

        if let Some((radius, sigma)) = blur_params(cfg.bloom_strength * self.canvas.scale_factor()) {
            let glow = blur_rgba8_premul(
                self.layer.data_as_u8_slice(),
                self.canvas.width,
                self.canvas.height,
                radius,
                sigma,
            )?;
            over_in_place(self.frame.data_as_u8_slice_mut(), &glow, BLOOM_OPACITY)?;
        }
        over_in_place(self.frame.data_as_u8_slice_mut(), self.layer.data_as_u8_slice(), 1.0)
    }

    fn draw_foreground(&mut self, cfg: &SceneConfig, beat: bool, shake: Vec2) -> BeatframeResult<()> {
        let scale = self.canvas.scale_factor();
        let center = self.canvas.center() + shake;

        let center_image = match cfg.center_image.as_deref() {
            Some(key) => match self.images.get_or_load(key) {
                Some((img, paint)) => Some((f64::from(img.width), f64::from(img.height), paint.clone())),
                None => {
                    tracing::trace!(key, "center image unavailable");
                    None
                }
            },
            None => None,
        };

        let text = if cfg.show_text && !self.fonts.is_empty() {
            self.layout_text(cfg, scale)
        } else {
            Vec::new()
        };

        if center_image.is_none() && text.is_empty() {
            return Ok(());
        }

        let canvas = self.canvas;
        render_layer(&mut self.layer, canvas, |ctx| {
            if let Some((iw, ih, paint)) = center_image {
                let pulse = if beat { spectrum::BEAT_PULSE } else { 1.0 };
                let side = cfg.center_image_size * f64::from(canvas.height) * pulse;
                let m = iw.min(ih);
                let (ox, oy) = ((iw - m) * 0.5, (ih - m) * 0.5);
                let xf = Affine::translate((center.x - side * 0.5, center.y - side * 0.5))
                    * Affine::scale(side / m)
                    * Affine::translate((-ox, -oy));
                let clip = if cfg.center_image_circular {
                    kurbo::Circle::new((iw * 0.5, ih * 0.5), m * 0.5).to_path(0.1)
                } else {
                    kurbo::Rect::new(ox, oy, ox + m, oy + m).to_path(0.1)
                };
                ctx.set_transform(affine_to_cpu(xf));
                ctx.set_paint(paint);
                ctx.fill_path(&bezpath_to_cpu(&clip));
            }

            if !text.is_empty() {
                draw_text_block(ctx, cfg, canvas, &text, shake);
            }
        })?;
        over_in_place(self.frame.data_as_u8_slice_mut(), self.layer.data_as_u8_slice(), 1.0)
    }

    fn layout_text(&mut self, cfg: &SceneConfig, scale: f64) -> Vec<TextLine> {
        let c = cfg.text_color;
        let brush = TextBrush {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        };
        let spacing = (cfg.letter_spacing * scale) as f32;
        let title = (cfg.text_size * scale) as f32;
        [(cfg.text_line1.as_str(), title), (cfg.text_line2.as_str(), title * 0.5)]
            .into_iter()
            .filter_map(|(line, size)| {
                self.fonts
                    .layout_line(line, &cfg.font_family, size, spacing, brush)
            })
            .collect()
    }
}

fn draw_text_block(
    ctx: &mut vello_cpu::RenderContext,
    cfg: &SceneConfig,
    canvas: Canvas,
    lines: &[TextLine],
    shake: Vec2,
) {
    let scale = canvas.scale_factor();
    let gap = 12.0 * scale;
    let block_h: f64 =
        lines.iter().map(|l| f64::from(l.height())).sum::<f64>() + gap * (lines.len().saturating_sub(1)) as f64;
    let h = f64::from(canvas.height);
    let mut y = match cfg.mode {
        LayoutMode::Circular => h * 0.92 - block_h,
        LayoutMode::Linear => h * 0.08,
    } + shake.y;

    if cfg.text_opacity < 1.0 {
        ctx.push_opacity_layer(cfg.text_opacity as f32);
    }
    for line in lines {
        let x = (f64::from(canvas.width) - f64::from(line.width())) * 0.5 + shake.x;
        if cfg.text_shadow {
            let off = 3.0 * scale;
            ctx.set_transform(affine_to_cpu(Affine::translate((x + off, y + off))));
            draw_line(
                ctx,
                line,
                Some(TextBrush {
                    r: 0,
                    g: 0,
                    b: 0,
                    a: 160,
                }),
            );
        }
        ctx.set_transform(affine_to_cpu(Affine::translate((x, y))));
        draw_line(ctx, line, None);
        y += f64::from(line.height()) + gap;
    }
    if cfg.text_opacity < 1.0 {
        ctx.pop_layer();
    }
}

fn render_layer(
    layer: &mut vello_cpu::Pixmap,
    canvas: Canvas,
    draw: impl FnOnce(&mut vello_cpu::RenderContext),
) -> BeatframeResult<()> {
    let (w, h) = canvas_u16(canvas)?;
    clear_pixmap(layer, [0, 0, 0, 0]);
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    draw(&mut ctx);
    ctx.flush();
    ctx.render_to_pixmap(layer);
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
