use float_ord::FloatOrd;
use geo::Rect;

/// Area of the intersection of two rectangles, zero when they are disjoint
/// on either axis.
pub fn overlap_area(a: &Rect<f64>, b: &Rect<f64>) -> f64 {
    let overlap_xmin = a.min().x.max(b.min().x);
    let overlap_ymin = a.min().y.max(b.min().y);
    let overlap_xmax = a.max().x.min(b.max().x);
    let overlap_ymax = a.max().y.min(b.max().y);

    (overlap_xmax - overlap_xmin).max(0.0) * (overlap_ymax - overlap_ymin).max(0.0)
}

pub fn rect_area(rect: &Rect<f64>) -> f64 {
    rect.width() * rect.height()
}

pub fn center_x(rect: &Rect<f64>) -> f64 {
    (rect.min().x + rect.max().x) / 2.0
}

pub fn within_closed(inner: &Rect<f64>, outer: &Rect<f64>) -> bool {
    inner.min().x >= outer.min().x
        && inner.min().y >= outer.min().y
        && inner.max().x <= outer.max().x
        && inner.max().y <= outer.max().y
}

/// Title directory of a page image, `"unknown"` for flat file names.
pub fn manga_title(file_name: &str) -> &str {
    match file_name.split_once('/') {
        Some((title, _)) => title,
        None => "unknown",
    }
}

pub(crate) fn sorted_samples(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by_key(|value| FloatOrd(*value));
    sorted
}

#[cfg(test)]
mod tests {
    use geo::coord;

    use super::*;

    fn rect(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Rect<f64> {
        Rect::new(coord! { x: xmin, y: ymin }, coord! { x: xmax, y: ymax })
    }

    #[test]
    fn disjoint_rects_have_no_overlap() {
        assert_eq!(
            overlap_area(&rect(0.0, 0.0, 10.0, 10.0), &rect(20.0, 0.0, 30.0, 10.0)),
            0.0
        );
        assert_eq!(
            overlap_area(&rect(0.0, 0.0, 10.0, 10.0), &rect(5.0, 5.0, 15.0, 15.0)),
            25.0
        );
    }

    #[test]
    fn manga_title_is_first_path_segment() {
        assert_eq!(manga_title("ARMS/001.jpg"), "ARMS");
        assert_eq!(manga_title("001.jpg"), "unknown");
    }
}
