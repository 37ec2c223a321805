use ndarray::{Array2, ArrayView2};

/// Harris corner response `det(M) - k * trace(M)^2`.
///
/// Gradients are Sobel, the structure tensor is smoothed with a 3x3
/// binomial window. The outer two-pixel ring is left at zero.
pub fn harris_response(image: ArrayView2<f32>, k: f32) -> Array2<f32> {
    let (h, w) = image.dim();
    let mut response = Array2::<f32>::zeros((h, w));
    if h < 5 || w < 5 {
        return response;
    }

    let mut ixx = Array2::<f32>::zeros((h, w));
    let mut iyy = Array2::<f32>::zeros((h, w));
    let mut ixy = Array2::<f32>::zeros((h, w));
    for r in 1..h - 1 {
        for c in 1..w - 1 {
            let gx = (image[[r - 1, c + 1]] + 2.0 * image[[r, c + 1]] + image[[r + 1, c + 1]])
                - (image[[r - 1, c - 1]] + 2.0 * image[[r, c - 1]] + image[[r + 1, c - 1]]);
            let gy = (image[[r + 1, c - 1]] + 2.0 * image[[r + 1, c]] + image[[r + 1, c + 1]])
                - (image[[r - 1, c - 1]] + 2.0 * image[[r - 1, c]] + image[[r - 1, c + 1]]);
            ixx[[r, c]] = gx * gx;
            iyy[[r, c]] = gy * gy;
            ixy[[r, c]] = gx * gy;
        }
    }

    const WINDOW: [f32; 3] = [1.0, 2.0, 1.0];
    for r in 2..h - 2 {
        for c in 2..w - 2 {
            let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
            for (i, wr) in WINDOW.iter().enumerate() {
                for (j, wc) in WINDOW.iter().enumerate() {
                    let weight = wr * wc / 16.0;
                    let (rr, cc) = (r + i - 1, c + j - 1);
                    sxx += weight * ixx[[rr, cc]];
                    syy += weight * iyy[[rr, cc]];
                    sxy += weight * ixy[[rr, cc]];
                }
            }
            let det = sxx * syy - sxy * sxy;
            let trace = sxx + syy;
            response[[r, c]] = det - k * trace * trace;
        }
    }
    response
}
