//! 把覆盖层画到渲染好的页面上

use std::path::Path;

use image::{Pixel, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use veil_core::{DisplayRect, OverlayPlan};

use crate::error::RenderError;

/// 显示空间矩形裁剪到图像范围内，完全落在外面时返回 `None`
fn pixel_rect(image: &RgbaImage, rect: &DisplayRect) -> Option<Rect> {
    let x0 = rect.x.floor().max(0.0);
    let y0 = rect.y.floor().max(0.0);
    let x1 = (rect.x + rect.width).ceil().min(image.width() as f64);
    let y1 = (rect.y + rect.height).ceil().min(image.height() as f64);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(Rect::at(x0 as i32, y0 as i32).of_size((x1 - x0) as u32, (y1 - y0) as u32))
}

fn blend_rect(image: &mut RgbaImage, rect: Rect, color: Rgba<u8>) {
    for y in rect.top()..=rect.bottom() {
        for x in rect.left()..=rect.right() {
            image.get_pixel_mut(x as u32, y as u32).blend(&color);
        }
    }
}

/// 按绘制顺序合成覆盖层
///
/// 不透明填充直接覆盖像素，半透明填充与底图混合；描边向内绘制。
pub fn compose(image: &mut RgbaImage, plan: &OverlayPlan) {
    for item in &plan.items {
        let Some(rect) = pixel_rect(image, &item.rect) else {
            continue;
        };

        let fill = Rgba(item.style.fill());
        if fill[3] == u8::MAX {
            draw_filled_rect_mut(image, rect, fill);
        } else {
            blend_rect(image, rect, fill);
        }

        if let Some((color, width)) = item.style.stroke() {
            for inset in 0..width {
                let w = rect.width().saturating_sub(inset * 2);
                let h = rect.height().saturating_sub(inset * 2);
                if w == 0 || h == 0 {
                    break;
                }
                let ring = Rect::at(rect.left() + inset as i32, rect.top() + inset as i32).of_size(w, h);
                draw_hollow_rect_mut(image, ring, Rgba(color));
            }
        }
    }
}

/// 保存为 PNG 预览
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), RenderError> {
    image.save_with_format(path, image::ImageFormat::Png)?;
    log::info!("[Render] 预览已保存到: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_core::{OverlayItem, OverlayStyle};

    fn plan(rect: DisplayRect, style: OverlayStyle) -> OverlayPlan {
        OverlayPlan {
            page: 1,
            scale: 1.0,
            items: vec![OverlayItem {
                id: None,
                rect,
                style,
            }],
        }
    }

    fn white(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]))
    }

    #[test]
    fn test_redaction_is_opaque() {
        let mut image = white(100, 100);
        let rect = DisplayRect {
            x: 10.0,
            y: 20.0,
            width: 30.0,
            height: 10.0,
        };
        compose(&mut image, &plan(rect, OverlayStyle::Redaction));

        assert_eq!(image.get_pixel(10, 20), &Rgba([0, 0, 0, 255]));
        assert_eq!(image.get_pixel(39, 29), &Rgba([0, 0, 0, 255]));
        assert_eq!(image.get_pixel(40, 29), &Rgba([255, 255, 255, 255]));
        assert_eq!(image.get_pixel(10, 30), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_suggestion_is_tinted_and_outlined() {
        let mut image = white(100, 100);
        let rect = DisplayRect {
            x: 10.0,
            y: 10.0,
            width: 40.0,
            height: 40.0,
        };
        compose(&mut image, &plan(rect, OverlayStyle::Suggestion));

        assert_eq!(image.get_pixel(10, 10), &Rgba([255, 0, 0, 255]));
        let inner = image.get_pixel(30, 30);
        assert_eq!(inner[0], 255);
        assert!(inner[1] < 255 && inner[1] > 0);
    }

    #[test]
    fn test_offscreen_rect_is_skipped() {
        let mut image = white(20, 20);
        let rect = DisplayRect {
            x: 50.0,
            y: 50.0,
            width: 10.0,
            height: 10.0,
        };
        compose(&mut image, &plan(rect, OverlayStyle::Redaction));
        assert!(image.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }
}
