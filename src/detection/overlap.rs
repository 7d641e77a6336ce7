// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! 重叠分析 (Overlap Analyzer)
//! 职责: 两两计算同帧检测框的IoU, 指定类别对重叠时将主体类别改标为危险类别

use super::types::{BBox, Detection, DetectionSet, HAZARD_CLASS_ID};

/// 两个框的交并比
pub fn iou(a: &BBox, b: &BBox) -> f32 {
    a.iou(b)
}

/// 一帧的标记结果
#[derive(Clone, Debug, PartialEq)]
pub struct TagOutcome {
    pub detections: DetectionSet,
    pub hazard: bool,
    pub relabeled: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlapAnalyzer {
    /// (A, B): B 为被改标的主体类别 (如 worker)
    hazard_pair: (u32, u32),
    hazard_class_id: u32,
}

impl Default for OverlapAnalyzer {
    fn default() -> Self {
        Self::new((0, 1), HAZARD_CLASS_ID)
    }
}

impl OverlapAnalyzer {
    pub fn new(hazard_pair: (u32, u32), hazard_class_id: u32) -> Self {
        Self {
            hazard_pair,
            hazard_class_id,
        }
    }

    pub fn hazard_pair(&self) -> (u32, u32) {
        self.hazard_pair
    }

    pub fn hazard_class_id(&self) -> u32 {
        self.hazard_class_id
    }

    /// 单遍扫描 (i < j, 按输入顺序), 不迭代到不动点.
    ///
    /// 已改标为危险类别的检测在本遍后续比较中不再匹配原类别对.
    /// 输入不会被修改, 返回新的检测集合.
    pub fn tag(&self, detections: &[Detection]) -> TagOutcome {
        let mut tagged = detections.to_vec();
        let mut relabeled = 0;
        let (a, b) = self.hazard_pair;

        for i in 0..tagged.len() {
            for j in (i + 1)..tagged.len() {
                if iou(&tagged[i].bbox, &tagged[j].bbox) <= 0. {
                    continue;
                }
                let (ci, cj) = (tagged[i].class_id, tagged[j].class_id);
                let subject = if ci == a && cj == b {
                    Some(j)
                } else if ci == b && cj == a {
                    Some(i)
                } else {
                    None
                };
                if let Some(k) = subject {
                    tagged[k].class_id = self.hazard_class_id;
                    relabeled += 1;
                }
            }
        }

        TagOutcome {
            detections: tagged,
            hazard: relabeled > 0,
            relabeled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(class_id: u32, x1: f32, y1: f32, x2: f32, y2: f32) -> Detection {
        Detection::new(BBox::new(x1, y1, x2, y2), class_id, 0.9)
    }

    #[test]
    fn test_iou_symmetric() {
        let pairs = [
            (BBox::new(0., 0., 10., 10.), BBox::new(5., 5., 15., 15.)),
            (BBox::new(0., 0., 4., 8.), BBox::new(2., -3., 30., 5.)),
            (BBox::new(0., 0., 1., 1.), BBox::new(7., 7., 9., 9.)),
        ];
        for (a, b) in pairs {
            assert_eq!(iou(&a, &b), iou(&b, &a));
        }
    }

    #[test]
    fn test_iou_identity_and_disjoint() {
        let a = BBox::new(3., 4., 13., 24.);
        assert!((iou(&a, &a) - 1.0).abs() < 1e-6);

        let far = BBox::new(100., 100., 110., 110.);
        assert_eq!(iou(&a, &far), 0.0);

        // 仅一个轴重叠
        let beside = BBox::new(0., 50., 10., 60.);
        assert_eq!(iou(&a, &beside), 0.0);
    }

    #[test]
    fn test_iou_partial_overlap() {
        let a = BBox::new(0., 0., 10., 10.);
        let b = BBox::new(5., 5., 15., 15.);
        assert!((iou(&a, &b) - 25. / 175.).abs() < 1e-6);
    }

    #[test]
    fn test_crane_worker_overlap_is_hazard() {
        let input = vec![det(0, 0., 0., 10., 10.), det(1, 5., 5., 15., 15.)];
        let out = OverlapAnalyzer::default().tag(&input);
        assert!(out.hazard);
        assert_eq!(out.relabeled, 1);
        assert_eq!(out.detections[0].class_id, 0);
        assert_eq!(out.detections[1].class_id, HAZARD_CLASS_ID);
        // 原始检测结果不受影响
        assert_eq!(input[1].class_id, 1);
    }

    #[test]
    fn test_subject_relabeled_in_either_order() {
        let input = vec![det(1, 5., 5., 15., 15.), det(0, 0., 0., 10., 10.)];
        let out = OverlapAnalyzer::default().tag(&input);
        assert!(out.hazard);
        assert_eq!(out.detections[0].class_id, HAZARD_CLASS_ID);
        assert_eq!(out.detections[1].class_id, 0);
    }

    #[test]
    fn test_same_class_overlap_is_not_hazard() {
        let input = vec![det(0, 0., 0., 10., 10.), det(0, 0., 0., 10., 10.)];
        let out = OverlapAnalyzer::default().tag(&input);
        assert!(!out.hazard);
        assert_eq!(out.detections, input);
    }

    #[test]
    fn test_empty_and_single() {
        let analyzer = OverlapAnalyzer::default();
        let out = analyzer.tag(&[]);
        assert!(out.detections.is_empty());
        assert!(!out.hazard);

        let single = vec![det(1, 0., 0., 5., 5.)];
        let out = analyzer.tag(&single);
        assert_eq!(out.detections, single);
        assert!(!out.hazard);
    }

    #[test]
    fn test_touching_boxes_do_not_trigger() {
        let input = vec![det(0, 0., 0., 10., 10.), det(1, 10., 0., 20., 10.)];
        assert!(!OverlapAnalyzer::default().tag(&input).hazard);
    }

    #[test]
    fn test_single_pass_does_not_retrigger() {
        // A-B 重叠, B-C 重叠, A-C 不重叠
        let input = vec![
            det(0, 0., 0., 10., 10.),
            det(1, 8., 0., 22., 10.),
            det(0, 20., 0., 30., 10.),
        ];
        let out = OverlapAnalyzer::default().tag(&input);
        assert!(out.hazard);
        assert_eq!(out.relabeled, 1);
        assert_eq!(
            out.detections.iter().map(|d| d.class_id).collect::<Vec<_>>(),
            vec![0, HAZARD_CLASS_ID, 0]
        );
    }

    #[test]
    fn test_custom_pair() {
        let analyzer = OverlapAnalyzer::new((3, 4), 9);
        let input = vec![det(4, 0., 0., 10., 10.), det(3, 1., 1., 9., 9.)];
        let out = analyzer.tag(&input);
        assert_eq!(out.detections[0].class_id, 9);
        assert_eq!(out.detections[1].class_id, 3);
    }
}
