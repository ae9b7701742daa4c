use proptest::prelude::*;

use lynx_common::{
    alloc::composable::TrackingAllocator,
    collections::DynArr,
};

#[derive(Clone, Debug)]
enum Op {
    Push(i32),
    Pop,
    Insert(usize, i32),
    Erase(usize),
    Resize(usize, i32),
    Reserve(usize),
    ShrinkToFit,
    Clear,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<i32>().prop_map(Op::Push),
        2 => Just(Op::Pop),
        2 => (any::<usize>(), any::<i32>()).prop_map(|(idx, val)| Op::Insert(idx, val)),
        2 => any::<usize>().prop_map(Op::Erase),
        1 => (0usize..64, any::<i32>()).prop_map(|(len, val)| Op::Resize(len, val)),
        1 => (0usize..64).prop_map(Op::Reserve),
        1 => Just(Op::ShrinkToFit),
        1 => Just(Op::Clear),
    ]
}

proptest! {
    #[test]
    fn behaves_like_vec(ops in prop::collection::vec(arb_op(), 0..200)) {
        let alloc = TrackingAllocator::default();
        let stats = alloc.stats();
        let mut arr: DynArr<i32, TrackingAllocator> = DynArr::new_in(alloc);
        let mut model = Vec::new();

        for op in ops {
            match op {
                Op::Push(val) => {
                    arr.push(val);
                    model.push(val);
                },
                Op::Pop => {
                    prop_assert_eq!(arr.pop(), model.pop());
                },
                Op::Insert(idx, val) => {
                    let idx = idx % (model.len() + 1);
                    let cursor = arr.insert(idx, val);
                    prop_assert_eq!(*cursor, val);
                    model.insert(idx, val);
                },
                Op::Erase(idx) => {
                    if !model.is_empty() {
                        let idx = idx % model.len();
                        let cursor = arr.erase(idx);
                        prop_assert_eq!(cursor.index(), idx);
                        model.remove(idx);
                    }
                },
                Op::Resize(len, val) => {
                    arr.resize(len, val);
                    model.resize(len, val);
                },
                Op::Reserve(cap) => {
                    let prev = arr.capacity();
                    arr.reserve(cap);
                    prop_assert_eq!(arr.capacity(), prev.max(cap));
                },
                Op::ShrinkToFit => {
                    arr.shrink_to_fit();
                    prop_assert_eq!(arr.capacity(), arr.len());
                },
                Op::Clear => {
                    arr.clear();
                    model.clear();
                },
            }

            prop_assert!(arr.len() <= arr.capacity());
            prop_assert_eq!(arr.as_slice(), model.as_slice());
            prop_assert_eq!(stats.live_allocs(), usize::from(arr.capacity() != 0));
        }
    }

    #[test]
    fn pushes_grow_geometrically(count in 1usize..300) {
        let mut arr = DynArr::<u16>::new();
        let mut expected_cap = 0;

        for i in 0..count {
            let ptr = arr.as_ptr();
            let full = arr.len() == arr.capacity();
            arr.push(i as u16);

            if full {
                expected_cap = if expected_cap == 0 { 2 } else { expected_cap * 2 };
            } else {
                prop_assert_eq!(arr.as_ptr(), ptr);
            }
            prop_assert_eq!(arr.capacity(), expected_cap);
        }
    }

    #[test]
    fn pop_returns_pushes_in_reverse(values in prop::collection::vec(any::<i64>(), 0..100)) {
        let mut arr = DynArr::new();
        for &val in &values {
            arr.push(val);
        }
        for &val in values.iter().rev() {
            prop_assert_eq!(arr.pop(), Some(val));
        }
        prop_assert!(arr.is_empty());
        prop_assert_eq!(arr.pop(), None);
    }

    #[test]
    fn copies_are_independent(values in prop::collection::vec(any::<u8>(), 0..50), extra in any::<u8>()) {
        let original = DynArr::from_slice(&values);
        let mut copy = original.clone();
        prop_assert_eq!(&copy, &original);
        prop_assert_eq!(copy.capacity(), original.capacity());

        copy.push(extra);
        if let Some(first) = copy.first_mut() {
            *first = first.wrapping_add(1);
        }
        prop_assert_eq!(original.as_slice(), values.as_slice());

        let mut source = copy;
        let taken = source.take();
        prop_assert!(source.is_empty());
        prop_assert_eq!(source.capacity(), 0);
        prop_assert_eq!(taken.len(), values.len() + 1);
    }

    #[test]
    fn at_matches_indexing(values in prop::collection::vec(any::<i32>(), 0..50), idx in 0usize..60) {
        let arr = DynArr::from_slice(&values);
        match arr.at(idx) {
            Ok(val) => {
                prop_assert!(idx < values.len());
                prop_assert!(core::ptr::eq(val, &arr[idx]));
            },
            Err(err) => {
                prop_assert!(idx >= values.len());
                prop_assert_eq!(err.index, idx);
                prop_assert_eq!(err.len, values.len());
            },
        }
    }
}
