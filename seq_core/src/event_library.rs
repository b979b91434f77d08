use std::collections::{BTreeMap, HashMap};

/*
 Deduplicating store for event payloads. Identical payloads share one ID so the
 sequence file never repeats an event definition. Keys are the exact bit
 patterns of the payload values, so two events compare equal only when they
 would serialize identically.
 */

#[derive(Clone,Debug,Default)]
pub struct EventLibrary {
    data:BTreeMap<usize,Vec<f32>>,
    tags:BTreeMap<usize,u8>,
    index:HashMap<Vec<u32>,usize>,
    next_id:usize,
}

fn key_of(row:&[f32],tag:u8) -> Vec<u32> {
    let mut key:Vec<u32> = row.iter().map(|v| v.to_bits()).collect();
    key.push(tag as u32);
    key
}

impl EventLibrary {
    pub fn new() -> EventLibrary {
        EventLibrary {
            data: BTreeMap::new(),
            tags: BTreeMap::new(),
            index: HashMap::new(),
            next_id: 1,
        }
    }

    /// id of an existing identical payload, or a freshly assigned one
    pub fn find_or_insert(&mut self,row:Vec<f32>) -> usize {
        self.find_or_insert_tagged(row,0)
    }

    pub fn find_or_insert_tagged(&mut self,row:Vec<f32>,tag:u8) -> usize {
        let key = key_of(&row,tag);
        if let Some(id) = self.index.get(&key) {
            return *id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.index.insert(key,id);
        self.data.insert(id,row);
        if tag != 0 {
            self.tags.insert(id,tag);
        }
        id
    }

    /// used by the file reader, which dictates its own ids
    pub fn insert_with_id(&mut self,id:usize,row:Vec<f32>,tag:u8) {
        assert!(id > 0,"event ids are 1-based");
        let key = key_of(&row,tag);
        self.index.insert(key,id);
        self.data.insert(id,row);
        if tag != 0 {
            self.tags.insert(id,tag);
        }
        if id >= self.next_id {
            self.next_id = id + 1;
        }
    }

    pub fn get(&self,id:usize) -> &Vec<f32> {
        self.data.get(&id).unwrap_or_else(|| panic!("event id {} not in library",id))
    }

    pub fn tag(&self,id:usize) -> u8 {
        *self.tags.get(&id).unwrap_or(&0)
    }

    pub fn contains(&self,id:usize) -> bool {
        self.data.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// rows in id order
    pub fn rows(&self) -> impl Iterator<Item=(usize,&Vec<f32>)> {
        self.data.iter().map(|(id,row)| (*id,row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_rows_share_an_id(){
        let mut lib = EventLibrary::new();
        let a = lib.find_or_insert(vec![1.0,2.0,3.0]);
        let b = lib.find_or_insert(vec![1.0,2.0,3.0]);
        let c = lib.find_or_insert(vec![1.0,2.0,4.0]);
        assert_eq!(a,b);
        assert_ne!(a,c);
        assert_eq!(lib.len(),2);
    }

    #[test]
    fn tags_separate_rows(){
        let mut lib = EventLibrary::new();
        let t = lib.find_or_insert_tagged(vec![1.0],b't');
        let g = lib.find_or_insert_tagged(vec![1.0],b'g');
        assert_ne!(t,g);
        assert_eq!(lib.tag(t),b't');
    }

    #[test]
    fn zero_is_distinct_from_negative_zero(){
        // -0.0 serializes differently, so it must not alias 0.0
        let mut lib = EventLibrary::new();
        let a = lib.find_or_insert(vec![0.0]);
        let b = lib.find_or_insert(vec![-0.0]);
        assert_ne!(a,b);
    }
}
