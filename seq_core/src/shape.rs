/*
 Waveform shapes are stored in the sequence file in a compressed form: the
 first derivative of the waveform is run-length encoded, with a repeated pair
 of equal values followed by the count of additional repeats. A shape whose
 compressed form is no shorter than the raw samples is stored uncompressed
 (detected by comparing data length against num_samples).
 */

const RLE_EPS:f32 = 1.0E-10;

#[derive(Clone,Debug,PartialEq)]
pub struct CompressedShape {
    pub num_samples:usize,
    pub data:Vec<f32>,
}

pub fn compress_shape(waveform:&[f32]) -> CompressedShape {
    assert!(!waveform.is_empty(),"cannot compress an empty waveform");
    // derivative with the first sample prepended so decompression is a cumsum
    let mut deriv = Vec::<f32>::with_capacity(waveform.len());
    deriv.push(waveform[0]);
    for i in 1..waveform.len() {
        deriv.push(waveform[i] - waveform[i-1]);
    }

    let mut data = Vec::<f32>::new();
    let mut i = 0;
    while i < deriv.len() {
        let mut run = 1;
        while i + run < deriv.len() && (deriv[i+run] - deriv[i]).abs() <= RLE_EPS {
            run += 1;
        }
        if run == 1 {
            data.push(deriv[i]);
        } else {
            // a repeated pair is always followed by the count of extra repeats,
            // even when that count is zero
            data.push(deriv[i]);
            data.push(deriv[i]);
            data.push((run - 2) as f32);
        }
        i += run;
    }

    if data.len() >= waveform.len() {
        // compression did not pay off, store raw samples
        return CompressedShape {
            num_samples: waveform.len(),
            data: waveform.to_vec(),
        }
    }

    CompressedShape {
        num_samples: waveform.len(),
        data,
    }
}

pub fn decompress_shape(shape:&CompressedShape) -> Vec<f32> {
    if shape.data.len() == shape.num_samples {
        // stored uncompressed
        return shape.data.clone();
    }

    let mut deriv = Vec::<f32>::with_capacity(shape.num_samples);
    let mut i = 0;
    while i < shape.data.len() {
        let value = shape.data[i];
        if i + 1 < shape.data.len() && (shape.data[i+1] - value).abs() <= RLE_EPS {
            assert!(i + 2 < shape.data.len(),"corrupt compressed shape: repeated pair with no count");
            let extra = shape.data[i+2] as usize;
            for _ in 0..extra + 2 {
                deriv.push(value);
            }
            i += 3;
        } else {
            deriv.push(value);
            i += 1;
        }
    }
    assert_eq!(deriv.len(),shape.num_samples,"corrupt compressed shape");

    let mut waveform = Vec::<f32>::with_capacity(shape.num_samples);
    let mut total = 0.0;
    for d in deriv {
        total += d;
        waveform.push(total);
    }
    waveform
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(w:&[f32]) {
        let c = compress_shape(w);
        let d = decompress_shape(&c);
        assert_eq!(d.len(),w.len());
        for (a,b) in d.iter().zip(w.iter()) {
            assert!((a-b).abs() < 1.0E-5,"{} != {}",a,b);
        }
    }

    #[test]
    fn plateau_compresses_well(){
        let w = vec![1.0;1000];
        let c = compress_shape(&w);
        assert!(c.data.len() <= 5,"plateau should collapse to a few entries, got {}",c.data.len());
        round_trip(&w);
    }

    #[test]
    fn trapezoid_round_trip(){
        let mut w = Vec::new();
        for i in 0..10 {w.push(i as f32/10.0)}
        w.extend(vec![1.0;50]);
        for i in (0..10).rev() {w.push(i as f32/10.0)}
        round_trip(&w);
    }

    #[test]
    fn incompressible_shape_stored_raw(){
        let w:Vec<f32> = (0..32).map(|i| ((i*i) as f32).sin()).collect();
        let c = compress_shape(&w);
        assert_eq!(c.data.len(),c.num_samples);
        round_trip(&w);
    }
}
