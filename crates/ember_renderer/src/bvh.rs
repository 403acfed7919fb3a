//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Binary tree over object bounding boxes. Each level splits on the longest
//! axis of its aggregate box, at the median of the box minima.

use std::cmp::Ordering;

use crate::{HitRecord, Hittable, HittableList, Ray};
use ember_math::{Aabb, Interval};
use rand::RngCore;

/// BVH node - either a branch with two children or a single-object leaf.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf holding exactly one object.
    Leaf(Box<dyn Hittable>),
    /// Built from an empty list; never hit.
    Empty,
}

impl BvhNode {
    /// Create a BVH from a list of hittable objects.
    pub fn new(objects: Vec<Box<dyn Hittable>>) -> Self {
        if objects.is_empty() {
            return BvhNode::Empty;
        }

        let bvh = Self::build(objects);
        log::debug!(
            "Built BVH: {} nodes, depth {}",
            bvh.node_count(),
            bvh.depth()
        );
        bvh
    }

    /// Build over the children of a [`HittableList`].
    pub fn from_list(list: HittableList) -> Self {
        Self::new(list.into_objects())
    }

    fn build(mut objects: Vec<Box<dyn Hittable>>) -> Self {
        let bounds = objects
            .iter()
            .fold(Aabb::EMPTY, |acc, obj| Aabb::surrounding(&acc, &obj.bounding_box()));

        if objects.len() == 1 {
            if let Some(object) = objects.pop() {
                return BvhNode::Leaf(object);
            }
        }

        let axis = bounds.longest_axis();
        objects.sort_by(|a, b| {
            let a_min = a.bounding_box().axis_interval(axis).min;
            let b_min = b.bounding_box().axis_interval(axis).min;
            a_min.partial_cmp(&b_min).unwrap_or(Ordering::Equal)
        });

        // Split at midpoint; two objects become one leaf on each side
        let mid = objects.len() / 2;
        let right_objects = objects.split_off(mid);

        let left = Self::build(objects);
        let right = Self::build(right_objects);

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox: bounds,
        }
    }

    /// Total number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf(_) => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.node_count() + right.node_count(),
        }
    }

    /// Length of the longest root-to-leaf path, counting nodes.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf(_) => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

impl From<HittableList> for BvhNode {
    fn from(list: HittableList) -> Self {
        Self::from_list(list)
    }
}

impl Hittable for BvhNode {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        match self {
            BvhNode::Empty => None,

            // The leaf's own box test is the object's job
            BvhNode::Leaf(object) => object.hit(ray, ray_t, rng),

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let hit_left = left.hit(ray, ray_t, rng);

                // Only check right up to closest hit
                let right_max = hit_left.as_ref().map_or(ray_t.max, |rec| rec.t);
                let hit_right = right.hit(ray, Interval::new(ray_t.min, right_max), rng);

                hit_right.or(hit_left)
            }
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Leaf(object) => object.bounding_box(),
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }
}
