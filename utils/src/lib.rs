use rustfft::FftPlanner;
use num_complex::Complex;

pub fn real_to_complex(real:&Vec<f32>) -> Vec<Complex<f32>> {
    real.iter().map(|val| Complex::<f32>::new(*val,0.0)).collect()
}

pub fn abs(x:&Vec<f32>) -> Vec<f32> {
    x.iter().map(|val| val.abs()).collect()
}

/// trapezoidal integration with an optional uniform sample spacing (defaults to 1)
pub fn trapz(y:&Vec<f32>,spacing:Option<f32>) -> f32 {
    let dx = spacing.unwrap_or(1.0);
    if y.len() < 2 {return 0.0}
    let mut sum = 0.0;
    for i in 0..y.len()-1 {
        sum += 0.5*(y[i] + y[i+1])*dx;
    }
    sum
}

pub fn cumsum(x:&Vec<f32>) -> Vec<f32> {
    let mut total = 0.0;
    x.iter().map(|val| {total += val; total}).collect()
}

pub fn diff(x:&Vec<f32>) -> Vec<f32> {
    if x.len() < 2 {return Vec::new()}
    (1..x.len()).map(|i| x[i]-x[i-1]).collect()
}

pub fn argsort(data:Vec<f32>) -> Vec<usize> {
    let mut indices = (0..data.len()).collect::<Vec<_>>();
    indices.sort_by(|&a,&b| data[a].partial_cmp(&data[b]).expect("cannot sort non-finite values"));
    indices
}

pub fn normalize(real:&Vec<f32>) -> Vec<f32> {
    let abs_max = real
        .iter()
        .max_by(|x, y| x.abs().partial_cmp(&y.abs()).unwrap())
        .unwrap();
    real.iter().map(|x| x/abs_max).collect()
}

/// linear interpolation of (xp,fp) sample pairs at the query points x.
/// query points outside the sampled range clamp to the end values
pub fn interp1(xp:&Vec<f32>,fp:&Vec<f32>,x:&Vec<f32>) -> Vec<f32> {
    if xp.len() != fp.len() {panic!("sample vectors must be the same length")}
    if xp.is_empty() {panic!("cannot interpolate empty sample vectors")}
    x.iter().map(|&q| {
        if q <= xp[0] {return fp[0]}
        if q >= xp[xp.len()-1] {return fp[fp.len()-1]}
        let mut i = 0;
        while xp[i+1] < q {i += 1}
        let frac = (q - xp[i])/(xp[i+1] - xp[i]);
        fp[i] + frac*(fp[i+1] - fp[i])
    }).collect()
}

/// fourier transform of a complex waveform, returning the zero-centered magnitude
/// spectrum zero-padded out to n_samples
pub fn freq_spectrum(waveform:&Vec<Complex<f32>>,n_samples:usize) -> Vec<f32> {
    let n = n_samples.max(waveform.len());
    let mut fft_planner = FftPlanner::<f32>::new();
    let fft = fft_planner.plan_fft_forward(n);
    let mut buffer = waveform.clone();
    buffer.resize(n,Complex::new(0.0,0.0));
    fft.process(&mut buffer);
    buffer.rotate_right(n/2);
    buffer.iter().map(|complex_val| complex_val.norm()).collect()
}

/// frequency axis (Hz) matching freq_spectrum output for a given sample period
pub fn freq_axis(sample_period:f32,n_samples:usize) -> Vec<f32> {
    let df = 1.0/(sample_period*n_samples as f32);
    (0..n_samples).map(|i| (i as f32 - (n_samples/2) as f32)*df).collect()
}

/// full width at half max of the magnitude spectrum of a complex waveform
pub fn bandwidth(waveform:&Vec<Complex<f32>>,sample_period:f32) -> f32 {
    let n = 65536.max(waveform.len());
    let spec = normalize(&freq_spectrum(waveform,n));
    let axis = freq_axis(sample_period,n);
    let mut upper = 0;
    for i in n/2..n-1 {
        if spec[i] >= 0.5 && spec[i+1] < 0.5 {
            upper = i;
            break
        }
    }
    if upper == 0 {panic!("error finding full width at half max")}
    2.0*axis[upper]
}
