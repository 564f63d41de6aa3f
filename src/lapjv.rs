/*-----------------------------------------------------------------------------
lapjv.rs - Jonker-Volgenant linear assignment algorithm

Dense solver over a square cost matrix: column reduction with reduction
transfer, two rounds of augmenting row reduction, then augmentation along
shortest alternating paths for the rows still free. `x[i]` receives the
column assigned to row `i`, `y[j]` the row assigned to column `j`.
-----------------------------------------------------------------------------*/

use std::vec;

const LARGE: f64 = 1e9;

/// Column reduction and reduction transfer. Returns the number of rows
/// left unassigned.
pub(crate) fn ccrt_dense(
    n: usize,
    cost: &[Vec<f64>],
    free_rows: &mut Vec<usize>,
    x: &mut [isize],
    y: &mut [isize],
    v: &mut [f64],
) -> usize {
    // initialize x, y, v
    for i in 0..n {
        x[i] = -1;
        v[i] = LARGE;
        y[i] = 0;
    }
    for i in 0..n {
        for j in 0..n {
            let c = cost[i][j];
            if c < v[j] {
                v[j] = c;
                y[j] = i as isize;
            }
        }
    }

    let mut unique = vec![true; n];
    let mut j = n;
    debug_assert!(j > 0, "n must be greater than 0");
    while j > 0 {
        j -= 1;
        let i = y[j] as usize;
        if x[i] < 0 {
            x[i] = j as isize;
        } else {
            unique[i] = false;
            y[j] = -1;
        }
    }

    let mut n_free_rows = 0;

    for i in 0..n {
        if x[i] < 0 {
            free_rows[n_free_rows] = i;
            n_free_rows += 1;
        } else if unique[i] {
            let j = x[i] as usize;
            let mut min = LARGE;
            for j2 in 0..n {
                if j2 == j {
                    continue;
                }
                let c = cost[i][j2] - v[j2];
                if c < min {
                    min = c;
                }
            }
            v[j] -= min;
        }
    }
    n_free_rows
}

/// Augmenting row reduction over the currently free rows. Returns the
/// number of rows still free afterwards.
pub(crate) fn carr_dense(
    n: usize,
    cost: &[Vec<f64>],
    n_free_rows: usize,
    free_rows: &mut Vec<usize>,
    x: &mut [isize],
    y: &mut [isize],
    v: &mut [f64],
) -> usize {
    let mut current = 0;
    let mut new_free_rows = 0;
    let mut rr_cnt = 0;

    while current < n_free_rows {
        rr_cnt += 1;
        let free_i = free_rows[current];
        current += 1;

        // lowest and second-lowest reduced cost over the row
        let mut j1 = 0;
        let mut j2: isize = -1;
        let mut v1 = cost[free_i][0] - v[0];
        let mut v2 = LARGE;

        for j in 1..n {
            let c = cost[free_i][j] - v[j];
            if c < v2 {
                if c >= v1 {
                    v2 = c;
                    j2 = j as isize;
                } else {
                    v2 = v1;
                    v1 = c;
                    j2 = j1;
                    j1 = j as isize;
                }
            }
        }
        let mut i0 = y[j1 as usize];
        let v1_new = v[j1 as usize] - (v2 - v1);
        let v1_lowers = v1_new < v[j1 as usize];

        if rr_cnt < current * n {
            if v1_lowers {
                v[j1 as usize] = v1_new;
            } else if i0 >= 0 && j2 >= 0 {
                j1 = j2;
                i0 = y[j2 as usize];
            }

            if i0 >= 0 {
                if v1_lowers {
                    current -= 1;
                    free_rows[current] = i0 as usize;
                } else {
                    free_rows[new_free_rows] = i0 as usize;
                    new_free_rows += 1;
                }
            }
        } else if i0 >= 0 {
            free_rows[new_free_rows] = i0 as usize;
            new_free_rows += 1;
        }
        x[free_i] = j1;
        y[j1 as usize] = free_i as isize;
    }
    new_free_rows
}

/// Move the columns tied for the lowest path length to the front of the
/// SCAN window `cols[lo..hi]`. Returns the new `hi`.
pub(crate) fn find_dense(
    n: usize,
    lo: usize,
    d: &[f64],
    cols: &mut [usize],
) -> usize {
    let mut hi = lo + 1;
    let mut mind = d[cols[lo]];
    for k in hi..n {
        let j = cols[k];
        if d[j] <= mind {
            if d[j] < mind {
                hi = lo;
                mind = d[j];
            }
            cols[k] = cols[hi];
            cols[hi] = j;
            hi += 1;
        }
    }
    hi
}

/// Scan the rows matched to the columns in `cols[lo..hi]`, relaxing path
/// lengths of the remaining columns. Returns an unassigned column that
/// closes an augmenting path, or -1. The window bounds are written back
/// only when the scan is exhausted, so an early exit leaves the caller on
/// the current wave.
#[allow(clippy::too_many_arguments)]
pub(crate) fn scan_dense(
    n: usize,
    cost: &[Vec<f64>],
    plo: &mut usize,
    phi: &mut usize,
    d: &mut [f64],
    cols: &mut [usize],
    pred: &mut [usize],
    y: &[isize],
    v: &[f64],
) -> isize {
    let mut lo = *plo;
    let mut hi = *phi;

    while lo != hi {
        let mut j = cols[lo];
        lo += 1;
        let i = y[j] as usize;
        let mind = d[j];
        let h = cost[i][j] - v[j] - mind;

        for k in hi..n {
            j = cols[k];
            let cred_ij = cost[i][j] - v[j] - h;
            if cred_ij < d[j] {
                d[j] = cred_ij;
                pred[j] = i;
                if cred_ij == mind {
                    if y[j] < 0 {
                        return j as isize;
                    }
                    cols[k] = cols[hi];
                    cols[hi] = j;
                    hi += 1;
                }
            }
        }
    }
    *plo = lo;
    *phi = hi;
    -1
}

/// Single iteration of the Dijkstra-like search for the shortest
/// augmenting path starting at `start_i`. Updates the column prices `v`
/// for the READY set and returns the closing column.
pub(crate) fn find_path_dense(
    n: usize,
    cost: &[Vec<f64>],
    start_i: usize,
    y: &[isize],
    v: &mut [f64],
    pred: &mut [usize],
) -> usize {
    let mut lo = 0;
    let mut hi = 0;
    let mut final_j: isize = -1;
    let mut n_ready = 0;

    let mut cols: Vec<usize> = (0..n).collect();
    let mut d = vec![0.0; n];

    for j in 0..n {
        pred[j] = start_i;
        d[j] = cost[start_i][j] - v[j];
    }
    while final_j == -1 {
        // No columns left on the SCAN list.
        if lo == hi {
            n_ready = lo;
            hi = find_dense(n, lo, &d, &mut cols);
            for &j in cols.iter().take(hi).skip(lo) {
                if y[j] < 0 {
                    final_j = j as isize;
                }
            }
        }
        if final_j == -1 {
            final_j =
                scan_dense(n, cost, &mut lo, &mut hi, &mut d, &mut cols, pred, y, v);
        }
    }

    let mind = d[cols[lo]];
    for &j in cols.iter().take(n_ready) {
        v[j] += d[j] - mind;
    }

    final_j as usize
}

/// Augment the assignment for every remaining free row.
pub(crate) fn ca_dense(
    n: usize,
    cost: &[Vec<f64>],
    n_free_rows: usize,
    free_rows: &[usize],
    x: &mut [isize],
    y: &mut [isize],
    v: &mut [f64],
) {
    let mut pred = vec![0usize; n];

    for &free_i in free_rows.iter().take(n_free_rows) {
        let mut i: isize = -1;
        let mut k = 0;

        let mut j = find_path_dense(n, cost, free_i, y, v, &mut pred) as isize;
        debug_assert!((j as usize) < n, "path ended outside the matrix");
        while i != free_i as isize {
            i = pred[j as usize] as isize;
            y[j as usize] = i;
            std::mem::swap(&mut j, &mut x[i as usize]);
            k += 1;
            debug_assert!(k <= n, "augmentation cycle detected");
        }
    }
}

/// Solve the square assignment problem of size `n`. Returns the number of
/// rows left free, which is zero for every finite cost matrix.
pub fn lapjv(
    n: usize,
    cost: &[Vec<f64>],
    x: &mut [isize],
    y: &mut [isize],
) -> usize {
    if n == 0 {
        return 0;
    }
    debug_assert!(cost.len() == n, "cost matrix has {} rows, expected {}", cost.len(), n);
    debug_assert!(x.len() == n && y.len() == n, "solution buffers must have length n");

    let mut free_rows = vec![0usize; n];
    let mut v = vec![0.0f64; n];

    let mut ret = ccrt_dense(n, cost, &mut free_rows, x, y, &mut v);
    let mut i = 0;
    while ret > 0 && i < 2 {
        ret = carr_dense(n, cost, ret, &mut free_rows, x, y, &mut v);
        i += 1;
    }
    if ret > 0 {
        ca_dense(n, cost, ret, &free_rows, x, y, &mut v);
        ret = 0;
    }
    ret
}
