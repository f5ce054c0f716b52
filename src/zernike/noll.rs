/// Radial degree `n` and azimuthal frequency `m` of the Noll index `j` (`j ≥ 1`)
///
/// Within a radial order `|m|` increases, each `|m| > 0` appearing twice: even `j` gives
/// the cosine term (`m > 0`) and odd `j` the sine term (`m < 0`).
pub fn noll_to_zern(j: usize) -> (usize, i64) {
    assert!(j > 0, "Noll indices start at 1");
    let mut n = 0usize;
    while (n + 1) * (n + 2) / 2 < j {
        n += 1;
    }
    let p = j - n * (n + 1) / 2 - 1;
    let m_abs = if n % 2 == 0 {
        2 * ((p + 1) / 2)
    } else {
        2 * (p / 2) + 1
    };
    let m = match (m_abs, j % 2) {
        (0, _) => 0,
        (m, 0) => m as i64,
        (m, _) => -(m as i64),
    };
    (n, m)
}

/// Largest radial degree over Noll indices `1..=jmax`
pub fn max_degree(jmax: usize) -> usize {
    if jmax == 0 {
        0
    } else {
        noll_to_zern(jmax).0
    }
}
