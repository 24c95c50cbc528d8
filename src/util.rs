pub fn sum_vector(vec: &[f64]) -> f64 {
    let mut sum = 0.0;
    for i in vec { sum += i }
    sum
}

pub fn mean(vec: &[f64]) -> f64 {
    if vec.is_empty() { return 0.0; }
    sum_vector(vec) / vec.len() as f64
}
