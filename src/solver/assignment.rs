/// Hungarian algorithm with potentials.
///
/// Assigns every row of `cost` to a distinct column minimizing the total cost.
/// Rows must not outnumber columns. Returns the total and the column picked for each row.
pub(crate) fn min_cost_assignment(cost: &[Vec<i64>]) -> (i64, Vec<usize>) {
    let n = cost.len();
    if n == 0 {
        return (0, Vec::new());
    }
    let m = cost[0].len();
    assert!(n <= m, "More rows ({}) than columns ({})", n, m);

    const INF: i64 = i64::max_value();

    // 1-based, index 0 is a fake row/column
    let mut u = vec![0i64; n + 1];
    let mut v = vec![0i64; m + 1];
    // p[j] = row assigned to column j
    let mut p = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0;
        let mut minv = vec![INF; m + 1];
        let mut used = vec![false; m + 1];
        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = INF;
            let mut j1 = 0;
            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let cur = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }
            for j in 0..=m {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }
        // augmenting path
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0; n];
    for j in 1..=m {
        if p[j] != 0 {
            assignment[p[j] - 1] = j - 1;
        }
    }
    let total = assignment
        .iter()
        .enumerate()
        .map(|(row, &col)| cost[row][col])
        .sum();
    (total, assignment)
}
