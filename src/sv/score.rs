use statrs::distribution::{DiscreteCDF, Poisson};

/// Phred 得分上限
pub const MAX_SCORE: i32 = 99;

const MIN_LAMBDA: f64 = 1e-10;

/// ln P(X >= n)，X ~ Poisson(lambda)
pub fn log_poisson_tail(n: u32, lambda: f64) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let lambda = lambda.max(MIN_LAMBDA);
    let tail = Poisson::new(lambda).map_or(1.0, |p| p.sf(u64::from(n) - 1));
    tail.ln()
}

/// 将按文库累加的 ln p 转为 Phred 得分并截断到 [0, 99]
pub fn phred_score(log_p: f64) -> i32 {
    let q = -10.0 * log_p / std::f64::consts::LN_10;
    if q.is_nan() {
        return 0;
    }
    q.clamp(0.0, MAX_SCORE as f64).round() as i32
}

/// 各文库（读段对数, 期望密度）在给定区域总长度下的联合得分
pub fn prob_score(region_size: i64, per_lib: impl IntoIterator<Item = (u32, f64)>) -> i32 {
    let log_p: f64 = per_lib
        .into_iter()
        .map(|(n, density)| log_poisson_tail(n, region_size as f64 * density))
        .sum();
    phred_score(log_p)
}

pub fn allele_frequency(sv_reads: u32, normal_reads: u32) -> f64 {
    let total = sv_reads + normal_reads;
    if total == 0 {
        return 0.0;
    }
    sv_reads as f64 / total as f64
}

/// 观测读段数相对于文库全基因组密度的拷贝数估计；密度为 0 时无法估计
pub fn copy_number(observed: u32, region_size: i64, read_density: f64) -> Option<f64> {
    let expected = region_size as f64 * read_density;
    (expected > 0.0).then(|| observed as f64 / expected)
}
